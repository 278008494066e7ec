//! JSON vocabulary artifact.
//!
//! ```json
//! { "format": "bytepair-vocab", "version": 1, "tokens": ["Ā", "ā", "...", "ab", "abab"] }
//! ```
//!
//! `tokens[i]` is the symbol for id `i`, written with the byte-level alphabet from
//! [`crate::bytes`] so arbitrary bytes survive the round trip.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bytes::{bytes_to_string, string_to_bytes};
use crate::error::{BpeError, Result};
use crate::vocab::Vocabulary;

/// Value of the `format` field identifying a vocabulary artifact.
pub const FORMAT_TAG: &str = "bytepair-vocab";
/// Artifact layout version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct VocabFile {
    format: String,
    version: u32,
    tokens: Vec<String>,
}

/// Serialises `vocab` to a JSON string.
pub fn vocab_json(vocab: &Vocabulary, pretty: bool) -> Result<String> {
    let file = VocabFile {
        format: FORMAT_TAG.to_string(),
        version: FORMAT_VERSION,
        tokens: vocab
            .symbols()
            .iter()
            .map(|symbol| bytes_to_string(symbol))
            .collect(),
    };
    let json = if pretty {
        serde_json::to_string_pretty(&file)?
    } else {
        serde_json::to_string(&file)?
    };
    Ok(json)
}

/// Rebuilds a vocabulary from JSON produced by [`vocab_json`].
///
/// Nothing is returned unless the whole artifact validates: the format tag and version match,
/// every token decodes, no symbol repeats, and ids `0..256` hold the base alphabet.
pub fn vocab_from_json(json: &str) -> Result<Vocabulary> {
    let file: VocabFile =
        serde_json::from_str(json).map_err(|err| BpeError::Deserialization(err.to_string()))?;
    if file.format != FORMAT_TAG {
        return Err(BpeError::Deserialization(format!(
            "unexpected format {:?}, expected {FORMAT_TAG:?}",
            file.format
        )));
    }
    if file.version != FORMAT_VERSION {
        return Err(BpeError::Deserialization(format!(
            "unsupported version {}, expected {FORMAT_VERSION}",
            file.version
        )));
    }

    let symbols = file
        .tokens
        .iter()
        .enumerate()
        .map(|(idx, token)| {
            string_to_bytes(token).map_err(|ch| {
                BpeError::Deserialization(format!(
                    "token {idx} contains U+{:04X}, outside the byte-level alphabet",
                    ch as u32
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let vocab = Vocabulary::from_symbols(symbols).map_err(|err| match err {
        BpeError::DuplicateSymbol { symbol, existing } => BpeError::Deserialization(format!(
            "symbol {:?} listed again after id {existing}",
            String::from_utf8_lossy(&symbol)
        )),
        other => BpeError::Deserialization(other.to_string()),
    })?;
    if !vocab.has_base_alphabet() {
        return Err(BpeError::Deserialization(
            "ids 0..256 do not hold the single-byte base alphabet".into(),
        ));
    }
    Ok(vocab)
}

/// Writes `vocab` to `path` as JSON.
pub fn save_vocab<P: AsRef<Path>>(vocab: &Vocabulary, path: P, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    let json = vocab_json(vocab, pretty)?;
    fs::write(path, json).map_err(|err| BpeError::io(err, Some(path.to_path_buf())))?;
    debug!("saved {} tokens to {}", vocab.size(), path.display());
    Ok(())
}

/// Reads a vocabulary artifact from `path`.
pub fn load_vocab<P: AsRef<Path>>(path: P) -> Result<Vocabulary> {
    let path = path.as_ref();
    let json =
        fs::read_to_string(path).map_err(|err| BpeError::io(err, Some(path.to_path_buf())))?;
    let vocab = vocab_from_json(&json)?;
    debug!("loaded {} tokens from {}", vocab.size(), path.display());
    Ok(vocab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    fn sample_vocab() -> Vocabulary {
        let mut vocab = Vocabulary::with_base_alphabet();
        for symbol in ["ab", "abab", " the", "é", "日本", "\u{0}\n"] {
            vocab.add_entry(symbol.as_bytes().to_vec()).unwrap();
        }
        // Half of a multi-byte code point.
        vocab.add_entry(vec![0xE6, 0x97]).unwrap();
        vocab
    }

    #[test]
    fn json_round_trip_is_exact() {
        let vocab = sample_vocab();
        for pretty in [false, true] {
            let json = vocab_json(&vocab, pretty).unwrap();
            let restored = vocab_from_json(&json).unwrap();
            assert_eq!(restored, vocab);
            for (id, symbol) in restored.iter() {
                assert_eq!(restored.lookup_id(symbol).unwrap(), id);
            }
        }
    }

    #[test]
    fn json_is_well_formed() {
        let json = vocab_json(&sample_vocab(), false).unwrap();
        let value: Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["format"], FORMAT_TAG);
        assert_eq!(value["version"], 1);
        assert_eq!(value["tokens"][256], "ab");
        assert_eq!(value["tokens"].as_array().unwrap().len(), 263);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vocab.json");
        let vocab = sample_vocab();
        save_vocab(&vocab, &path, true).unwrap();
        assert_eq!(load_vocab(&path).unwrap(), vocab);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = load_vocab(dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, BpeError::Io { path: Some(_), .. }));
    }

    #[test]
    fn truncated_json_is_rejected() {
        let json = vocab_json(&sample_vocab(), false).unwrap();
        let err = vocab_from_json(&json[..json.len() / 2]).expect_err("truncated");
        assert!(matches!(err, BpeError::Deserialization(_)));
    }

    #[test]
    fn wrong_format_and_version_are_rejected() {
        let json = vocab_json(&sample_vocab(), false).unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["format"] = Value::from("something-else");
        assert!(matches!(
            vocab_from_json(&value.to_string()),
            Err(BpeError::Deserialization(_))
        ));

        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["version"] = Value::from(99);
        assert!(matches!(
            vocab_from_json(&value.to_string()),
            Err(BpeError::Deserialization(message)) if message.contains("version 99")
        ));
    }

    #[test]
    fn duplicate_tokens_are_rejected() {
        let json = vocab_json(&sample_vocab(), false).unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["tokens"][257] = Value::from("ab");
        assert!(matches!(
            vocab_from_json(&value.to_string()),
            Err(BpeError::Deserialization(message)) if message.contains("listed again")
        ));
    }

    #[test]
    fn incomplete_alphabet_is_rejected() {
        let json = vocab_json(&sample_vocab(), false).unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["tokens"].as_array_mut().unwrap().remove(10);
        assert!(matches!(
            vocab_from_json(&value.to_string()),
            Err(BpeError::Deserialization(message)) if message.contains("base alphabet")
        ));
    }

    #[test]
    fn foreign_code_points_are_rejected() {
        let json = vocab_json(&sample_vocab(), false).unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["tokens"][256] = Value::from("\u{4e16}");
        assert!(matches!(
            vocab_from_json(&value.to_string()),
            Err(BpeError::Deserialization(message)) if message.contains("token 256")
        ));
    }
}

//! Utilities for converting between raw symbol bytes and JSON-safe token strings.
//!
//! Vocabulary symbols are arbitrary byte strings: merges routinely split UTF-8 code points,
//! so they cannot be stored as plain JSON strings. Each byte is mapped to a printable code
//! point from the GPT-2 byte-level alphabet instead, which keeps the artifact readable for
//! ASCII-heavy vocabularies while staying lossless for every byte value.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn byte_level_tables() -> &'static ([char; 256], HashMap<char, u8>) {
    static TABLES: OnceLock<([char; 256], HashMap<char, u8>)> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut forward = ['\0'; 256];
        let mut reverse = HashMap::with_capacity(256);
        let mut bs: Vec<u8> = (b'!'..=b'~').collect();
        bs.extend(b'\xA1'..=b'\xAC');
        bs.extend(b'\xAE'..=b'\xFF');
        let mut cs: Vec<u32> = bs.iter().map(|&b| u32::from(b)).collect();
        let mut seen: HashSet<u8> = bs.iter().copied().collect();
        let mut n = 0u32;
        for byte in 0u8..=255 {
            if seen.insert(byte) {
                bs.push(byte);
                cs.push(256 + n);
                n += 1;
            }
        }
        for (byte, codepoint) in bs.into_iter().zip(cs) {
            // Every code point produced above lies below U+0200.
            let ch = char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER);
            forward[byte as usize] = ch;
            reverse.insert(ch, byte);
        }
        (forward, reverse)
    })
}

/// Converts raw bytes into their byte-level string representation.
#[must_use]
pub fn bytes_to_string(bytes: &[u8]) -> String {
    let (forward, _) = byte_level_tables();
    bytes.iter().map(|&b| forward[b as usize]).collect()
}

/// Converts a string produced by [`bytes_to_string`] back into raw bytes.
///
/// Returns the first offending character when the string contains a code point outside the
/// byte-level alphabet.
pub fn string_to_bytes(text: &str) -> Result<Vec<u8>, char> {
    let (_, reverse) = byte_level_tables();
    text.chars()
        .map(|c| reverse.get(&c).copied().ok_or(c))
        .collect()
}

/// Returns `true` for the ASCII whitespace bytes we treat as delimiters: space, `\t`, `\n`,
/// `\r` and form feed. Vertical tab is not a delimiter.
#[inline]
#[must_use]
pub fn is_ascii_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}

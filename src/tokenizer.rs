//! Frozen vocabulary bundled with a prepared encoder.

use std::path::Path;

use rayon::prelude::*;

use crate::config::EncoderConfig;
use crate::decoder;
use crate::encoder::{Piece, SymbolTable};
use crate::error::Result;
use crate::serialization;
use crate::vocab::{TokenId, Vocabulary};

/// Read-only tokenizer over a trained [`Vocabulary`].
///
/// The symbol search order is computed once, so repeated encodes avoid re-sorting the
/// vocabulary.
#[must_use]
#[derive(Debug, Clone)]
pub struct Tokenizer {
    vocab: Vocabulary,
    table: SymbolTable,
    config: EncoderConfig,
}

impl Tokenizer {
    /// Freezes `vocab` for encoding with `config`.
    pub fn new(vocab: Vocabulary, config: EncoderConfig) -> Self {
        let table = SymbolTable::new(&vocab);
        Self {
            vocab,
            table,
            config,
        }
    }

    /// Loads a persisted vocabulary artifact from disk.
    pub fn from_file<P: AsRef<Path>>(path: P, config: EncoderConfig) -> Result<Self> {
        let vocab = serialization::load_vocab(path)?;
        Ok(Self::new(vocab, config))
    }

    /// Provides immutable access to the underlying vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Returns the encoder configuration.
    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Consumes the tokenizer, returning the vocabulary.
    pub fn into_vocab(self) -> Vocabulary {
        self.vocab
    }

    /// Encodes raw bytes into token identifiers.
    pub fn encode(&self, input: &[u8]) -> Result<Vec<TokenId>> {
        self.table.encode(&self.vocab, input, &self.config)
    }

    /// Encodes UTF-8 text into token identifiers.
    pub fn encode_str(&self, text: &str) -> Result<Vec<TokenId>> {
        self.encode(text.as_bytes())
    }

    /// Segments `input`, returning each token with the bytes it covers.
    pub fn pieces<'a>(&self, input: &'a [u8]) -> Result<Vec<Piece<'a>>> {
        self.table.pieces(&self.vocab, input, &self.config)
    }

    /// Encodes independent inputs in parallel. Output order matches input order.
    pub fn encode_batch<I>(&self, inputs: &[I]) -> Result<Vec<Vec<TokenId>>>
    where
        I: AsRef<[u8]> + Sync,
    {
        inputs
            .par_iter()
            .map(|input| self.encode(input.as_ref()))
            .collect()
    }

    /// Decodes token identifiers back into raw bytes.
    pub fn decode(&self, ids: &[TokenId]) -> Result<Vec<u8>> {
        decoder::decode(&self.vocab, ids)
    }

    /// Decodes token identifiers into a UTF-8 string.
    pub fn decode_to_string(&self, ids: &[TokenId]) -> Result<String> {
        decoder::decode_to_string(&self.vocab, ids)
    }
}

//! Reconstruction of text from token ids.

use crate::error::Result;
use crate::vocab::{TokenId, Vocabulary};

/// Concatenates the symbols of `ids` in order.
///
/// Fails with [`crate::BpeError::UnknownToken`] on the first id without a vocabulary entry.
pub fn decode(vocab: &Vocabulary, ids: &[TokenId]) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(ids.len() * 2);
    for &id in ids {
        bytes.extend_from_slice(vocab.lookup_symbol(id)?);
    }
    Ok(bytes)
}

/// Decodes `ids` and validates the result as UTF-8.
pub fn decode_to_string(vocab: &Vocabulary, ids: &[TokenId]) -> Result<String> {
    Ok(String::from_utf8(decode(vocab, ids)?)?)
}

//! Bidirectional symbol/id store shared by the trainer, encoder, and decoder.

use std::convert::TryFrom;

use ahash::AHashMap;

use crate::error::{BpeError, Result};

/// Token identifier used throughout the crate.
pub type TokenId = u32;
/// Adjacent token pair encoded as `(left, right)` token identifiers.
pub type Pair = (TokenId, TokenId);

/// Number of single-byte symbols in the base alphabet.
pub const BASE_VOCAB_SIZE: usize = 256;

/// Bijection between byte-string symbols and token ids.
///
/// Ids are dense: the entry added `n`-th (0-based) always receives id `n`, so ids `0..256`
/// are the base alphabet once [`Vocabulary::initialize_base_alphabet`] has run, and the
/// `k`-th merge is stored at `256 + k - 1`. Entries are never removed or rebound.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    symbols: Vec<Vec<u8>>,
    ids: AHashMap<Vec<u8>, TokenId>,
}

impl Vocabulary {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding only the 256 single-byte symbols.
    pub fn with_base_alphabet() -> Self {
        let mut vocab = Self::new();
        vocab.symbols.reserve(BASE_VOCAB_SIZE);
        vocab.ids.reserve(BASE_VOCAB_SIZE);
        for byte in 0u8..=u8::MAX {
            vocab.ids.insert(vec![byte], TokenId::from(byte));
            vocab.symbols.push(vec![byte]);
        }
        vocab
    }

    /// Populates ids `0..256` with one entry per byte value.
    ///
    /// The store must be empty; merges are only meaningful on top of a complete alphabet.
    pub fn initialize_base_alphabet(&mut self) -> Result<()> {
        if !self.symbols.is_empty() {
            return Err(BpeError::Internal(format!(
                "base alphabet must be initialised on an empty vocabulary (found {} entries)",
                self.symbols.len()
            )));
        }
        *self = Self::with_base_alphabet();
        Ok(())
    }

    /// Rebuilds a store from symbols listed in id order, rejecting duplicates.
    pub fn from_symbols<I>(symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut vocab = Self::new();
        for symbol in symbols {
            vocab.add_entry(symbol)?;
        }
        Ok(vocab)
    }

    /// Appends `symbol` under the next free id and returns that id.
    pub fn add_entry(&mut self, symbol: Vec<u8>) -> Result<TokenId> {
        if let Some(&existing) = self.ids.get(&symbol) {
            return Err(BpeError::DuplicateSymbol { symbol, existing });
        }
        let id = TokenId::try_from(self.symbols.len())
            .map_err(|_| BpeError::Internal("vocabulary size exceeded u32::MAX".into()))?;
        self.ids.insert(symbol.clone(), id);
        self.symbols.push(symbol);
        Ok(id)
    }

    /// Returns the id bound to `symbol`.
    pub fn lookup_id(&self, symbol: &[u8]) -> Result<TokenId> {
        self.get_id(symbol)
            .ok_or_else(|| BpeError::UnknownSymbol(symbol.to_vec()))
    }

    /// Returns the symbol bound to `id`.
    pub fn lookup_symbol(&self, id: TokenId) -> Result<&[u8]> {
        self.get_symbol(id).ok_or(BpeError::UnknownToken(id))
    }

    /// Non-failing variant of [`Vocabulary::lookup_id`].
    #[must_use]
    pub fn get_id(&self, symbol: &[u8]) -> Option<TokenId> {
        self.ids.get(symbol).copied()
    }

    /// Non-failing variant of [`Vocabulary::lookup_symbol`].
    #[must_use]
    pub fn get_symbol(&self, id: TokenId) -> Option<&[u8]> {
        self.symbols.get(id as usize).map(Vec::as_slice)
    }

    /// Number of entries, base alphabet included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` when the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of entries minted beyond the base alphabet.
    #[must_use]
    pub fn merge_count(&self) -> usize {
        self.symbols.len().saturating_sub(BASE_VOCAB_SIZE)
    }

    /// Returns `true` when ids `0..256` hold exactly the single-byte symbols.
    #[must_use]
    pub fn has_base_alphabet(&self) -> bool {
        self.symbols.len() >= BASE_VOCAB_SIZE
            && self.symbols[..BASE_VOCAB_SIZE]
                .iter()
                .enumerate()
                .all(|(idx, symbol)| symbol.len() == 1 && usize::from(symbol[0]) == idx)
    }

    /// Symbols in id order.
    #[must_use]
    pub fn symbols(&self) -> &[Vec<u8>] {
        &self.symbols
    }

    /// Iterates `(id, symbol)` entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &[u8])> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(idx, symbol)| (idx as TokenId, symbol.as_slice()))
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        // The reverse index is derived from `symbols`.
        self.symbols == other.symbols
    }
}

impl Eq for Vocabulary {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_alphabet_is_identity_on_bytes() {
        let mut vocab = Vocabulary::new();
        vocab.initialize_base_alphabet().expect("empty store");
        assert_eq!(vocab.size(), 256);
        assert!(vocab.has_base_alphabet());
        assert_eq!(vocab.lookup_id(b"a").unwrap(), 97);
        assert_eq!(vocab.lookup_symbol(255).unwrap(), &[0xFF]);
        assert_eq!(vocab.merge_count(), 0);
    }

    #[test]
    fn initialize_rejects_populated_store() {
        let mut vocab = Vocabulary::with_base_alphabet();
        assert!(matches!(
            vocab.initialize_base_alphabet(),
            Err(BpeError::Internal(_))
        ));
    }

    #[test]
    fn add_entry_assigns_dense_ids() {
        let mut vocab = Vocabulary::with_base_alphabet();
        assert_eq!(vocab.add_entry(b"ab".to_vec()).unwrap(), 256);
        assert_eq!(vocab.add_entry(b"abab".to_vec()).unwrap(), 257);
        assert_eq!(vocab.size(), 258);
        assert_eq!(vocab.lookup_symbol(257).unwrap(), b"abab");
        assert_eq!(vocab.lookup_id(b"ab").unwrap(), 256);
    }

    #[test]
    fn add_entry_rejects_duplicates_without_growing() {
        let mut vocab = Vocabulary::with_base_alphabet();
        let err = vocab.add_entry(b"z".to_vec()).expect_err("duplicate");
        assert!(matches!(
            err,
            BpeError::DuplicateSymbol { existing: 122, .. }
        ));
        assert_eq!(vocab.size(), 256);
    }

    #[test]
    fn lookups_report_absence() {
        let vocab = Vocabulary::with_base_alphabet();
        assert!(matches!(
            vocab.lookup_symbol(256),
            Err(BpeError::UnknownToken(256))
        ));
        assert!(matches!(
            vocab.lookup_id(b"xy"),
            Err(BpeError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn bijection_holds_for_every_entry() {
        let mut vocab = Vocabulary::with_base_alphabet();
        vocab.add_entry("é".as_bytes().to_vec()).unwrap();
        vocab.add_entry("éé".as_bytes().to_vec()).unwrap();
        assert_eq!(vocab.size(), 258);
        for (id, symbol) in vocab.iter() {
            assert_eq!(vocab.lookup_id(symbol).unwrap(), id);
        }
    }

    #[test]
    fn from_symbols_rejects_repeated_entries() {
        let symbols = vec![b"a".to_vec(), b"b".to_vec(), b"a".to_vec()];
        assert!(matches!(
            Vocabulary::from_symbols(symbols),
            Err(BpeError::DuplicateSymbol { existing: 0, .. })
        ));
    }
}

//! Longest-available-match segmentation of text into vocabulary tokens.
//!
//! A span is segmented by taking the longest vocabulary symbol that occurs anywhere inside it,
//! emitting its leftmost occurrence, and recursing into the text on either side. Output order
//! follows the document, not the order in which matches were found. The recursion is driven by
//! an explicit work stack so deeply unbalanced splits cannot exhaust the call stack.

use bstr::ByteSlice;

use crate::config::EncoderConfig;
use crate::error::{BpeError, Result};
use crate::segment::split_words;
use crate::vocab::{TokenId, Vocabulary};

/// One token produced by segmentation, borrowing its bytes from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece<'a> {
    /// Token id of the matched symbol.
    pub id: TokenId,
    /// Input bytes covered by the token.
    pub bytes: &'a [u8],
}

/// Vocabulary symbols ordered for longest-first matching.
///
/// Symbols are sorted by byte length, longest first; symbols of equal length are ordered by
/// ascending id, so earlier merges win ties.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    order: Vec<TokenId>,
    lengths: Vec<usize>,
}

enum Work {
    Span(usize, usize),
    Emit(TokenId, usize, usize),
}

impl SymbolTable {
    /// Builds the search order for `vocab`. Empty symbols are never matched.
    #[must_use]
    pub fn new(vocab: &Vocabulary) -> Self {
        let mut entries: Vec<(usize, TokenId)> = vocab
            .iter()
            .filter(|(_, symbol)| !symbol.is_empty())
            .map(|(id, symbol)| (symbol.len(), id))
            .collect();
        entries.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let (lengths, order) = entries.into_iter().unzip();
        Self { order, lengths }
    }

    /// Number of searchable symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` when no symbol can be matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Finds the first symbol in search order occurring in `span`.
    ///
    /// Returns the token id, the offset of its leftmost occurrence, and its length.
    #[must_use]
    pub fn longest_match(
        &self,
        vocab: &Vocabulary,
        span: &[u8],
    ) -> Option<(TokenId, usize, usize)> {
        // Symbols longer than the span cannot occur in it.
        let first = self.lengths.partition_point(|&len| len > span.len());
        self.order[first..]
            .iter()
            .zip(&self.lengths[first..])
            .find_map(|(&id, &len)| {
                let symbol = vocab.get_symbol(id)?;
                span.find(symbol).map(|idx| (id, idx, len))
            })
    }

    /// Segments `input` into pieces in document order.
    pub fn pieces<'a>(
        &self,
        vocab: &Vocabulary,
        input: &'a [u8],
        cfg: &EncoderConfig,
    ) -> Result<Vec<Piece<'a>>> {
        let mut out = Vec::new();
        if cfg.preserve_word_boundaries {
            for chunk in split_words(input, cfg.whitespace) {
                self.segment_into(vocab, chunk, &mut out)?;
            }
        } else {
            self.segment_into(vocab, input, &mut out)?;
        }
        Ok(out)
    }

    /// Encodes `input` into token ids.
    pub fn encode(
        &self,
        vocab: &Vocabulary,
        input: &[u8],
        cfg: &EncoderConfig,
    ) -> Result<Vec<TokenId>> {
        Ok(self
            .pieces(vocab, input, cfg)?
            .into_iter()
            .map(|piece| piece.id)
            .collect())
    }

    fn segment_into<'a>(
        &self,
        vocab: &Vocabulary,
        input: &'a [u8],
        out: &mut Vec<Piece<'a>>,
    ) -> Result<()> {
        let mut stack = vec![Work::Span(0, input.len())];
        while let Some(work) = stack.pop() {
            match work {
                Work::Span(start, end) if start == end => {}
                Work::Span(start, end) => {
                    let span = &input[start..end];
                    let (id, offset, len) = self
                        .longest_match(vocab, span)
                        .ok_or_else(|| BpeError::NoMatch {
                            span: span.to_vec(),
                        })?;
                    let match_start = start + offset;
                    let match_end = match_start + len;
                    // Popped in reverse: left remainder, match, right remainder.
                    stack.push(Work::Span(match_end, end));
                    stack.push(Work::Emit(id, match_start, match_end));
                    stack.push(Work::Span(start, match_start));
                }
                Work::Emit(id, start, end) => out.push(Piece {
                    id,
                    bytes: &input[start..end],
                }),
            }
        }
        Ok(())
    }
}

/// Encodes `input` against `vocab`, building a fresh [`SymbolTable`].
///
/// Prefer [`crate::Tokenizer`] when encoding repeatedly with the same vocabulary.
pub fn encode(vocab: &Vocabulary, input: &[u8], cfg: &EncoderConfig) -> Result<Vec<TokenId>> {
    SymbolTable::new(vocab).encode(vocab, input, cfg)
}

//! Whitespace-preserving word chunking applied before longest-match encoding.
//!
//! A chunk is a run of whitespace (possibly empty) followed by a run of non-whitespace, or a
//! trailing run of pure whitespace. Concatenating the chunks always reproduces the input.

use bstr::ByteSlice;

use crate::bytes::is_ascii_whitespace;
use crate::config::WhitespaceKind;

/// `(start, end, is_whitespace)` for one classified unit of input.
type Unit = (usize, usize, bool);

/// Splits `input` into word chunks, each led by the whitespace that precedes it.
#[must_use]
pub fn split_words(input: &[u8], kind: WhitespaceKind) -> Vec<&[u8]> {
    let units = classify(input, kind);
    let mut chunks = Vec::new();
    let mut idx = 0usize;
    while idx < units.len() {
        let start = units[idx].0;
        while idx < units.len() && units[idx].2 {
            idx += 1;
        }
        while idx < units.len() && !units[idx].2 {
            idx += 1;
        }
        let end = units[idx - 1].1;
        chunks.push(&input[start..end]);
    }
    chunks
}

fn classify(input: &[u8], kind: WhitespaceKind) -> Vec<Unit> {
    match kind {
        WhitespaceKind::Ascii => input
            .iter()
            .enumerate()
            .map(|(idx, &byte)| (idx, idx + 1, is_ascii_whitespace(byte)))
            .collect(),
        // Invalid UTF-8 decodes to U+FFFD, which is never whitespace.
        WhitespaceKind::Unicode => input
            .char_indices()
            .map(|(start, end, ch)| (start, end, ch.is_whitespace()))
            .collect(),
    }
}

//! Error handling utilities shared across the crate.

use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::vocab::TokenId;

/// Convenient result type used throughout the crate.
pub type Result<T, E = BpeError> = std::result::Result<T, E>;

/// Domain-specific error describing failures during training, encoding, decoding, or persistence.
#[derive(Debug, Error)]
pub enum BpeError {
    /// A symbol was added to the vocabulary twice. Indicates a trainer defect.
    #[error("symbol {symbol:?} already present in vocabulary with id {existing}")]
    DuplicateSymbol {
        /// Byte content of the rejected symbol.
        symbol: Vec<u8>,
        /// Id already bound to the symbol.
        existing: TokenId,
    },
    /// A non-empty span could not be matched against any vocabulary entry.
    #[error("no vocabulary entry matches span {span:?}; vocabulary is incomplete")]
    NoMatch {
        /// Bytes of the span that could not be segmented.
        span: Vec<u8>,
    },
    /// A token id has no vocabulary entry.
    #[error("unknown token id: {0}")]
    UnknownToken(TokenId),
    /// A symbol was looked up that is not part of the vocabulary.
    #[error("unknown symbol: {0:?}")]
    UnknownSymbol(Vec<u8>),
    /// A persisted vocabulary artifact is malformed or incomplete.
    #[error("malformed vocabulary artifact: {0}")]
    Deserialization(String),
    /// Decoded bytes are not valid UTF-8.
    #[error("decoded bytes are not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
    /// Training or encoding configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// Serialization failure while writing an artifact.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Catch-all variant for invariants that should not occur.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for BpeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl BpeError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }
}

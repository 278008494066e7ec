//! Byte pair encoding (BPE) vocabulary builder and longest-match tokenizer.
//!
//! The crate exposes both a library API and a `bytepair` command line interface. Training
//! starts from the 256 single-byte symbols and repeatedly merges the most frequent adjacent
//! pair of a corpus into a new vocabulary entry. The finished [`Vocabulary`] segments new text
//! by longest-available match and decodes token ids back to bytes.
//!
//! ```no_run
//! use bytepair::{serialization, EncoderConfig, Tokenizer, Trainer, TrainerConfig};
//!
//! # fn main() -> bytepair::Result<()> {
//! let trainer_cfg = TrainerConfig::builder()
//!     .target_vocab_size(512)
//!     .show_progress(false)
//!     .build()?;
//! let artifacts = Trainer::new(trainer_cfg).train(b"the cat sat on the mat")?;
//! serialization::save_vocab(&artifacts.vocab, "vocab.json", false)?;
//!
//! let tokenizer = Tokenizer::from_file("vocab.json", EncoderConfig::default())?;
//! let ids = tokenizer.encode_str("the mat")?;
//! assert_eq!(tokenizer.decode_to_string(&ids)?, "the mat");
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature. Users targeting the library
//! portion only can disable default features to avoid the CLI dependencies.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

pub mod bytes;
pub mod config;
pub mod corpus;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod segment;
pub mod serialization;
pub mod tokenizer;
pub mod trainer;
pub mod vocab;

pub use config::{EncoderConfig, IngestConfig, TrainerBuilder, TrainerConfig, WhitespaceKind};
pub use decoder::{decode, decode_to_string};
pub use encoder::{encode, Piece, SymbolTable};
pub use error::{BpeError, Result};
pub use metrics::{IterationMetrics, StopReason, TrainingMetrics};
pub use tokenizer::Tokenizer;
pub use trainer::{Trainer, TrainerArtifacts};
pub use vocab::{Pair, TokenId, Vocabulary, BASE_VOCAB_SIZE};

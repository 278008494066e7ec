//! Helpers for persisting and reloading trained vocabularies.

pub mod json;

pub use json::{load_vocab, save_vocab, vocab_from_json, vocab_json, FORMAT_TAG, FORMAT_VERSION};

//! Configuration builders controlling training, encoding, and corpus ingestion.

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::error::{BpeError, Result};
use crate::vocab::BASE_VOCAB_SIZE;

/// Configuration for BPE vocabulary training.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Target vocabulary size including the 256 base byte tokens.
    pub target_vocab_size: usize,
    /// Never counts a pair whose right-hand token is the ASCII space byte.
    ///
    /// This keeps most merges from crossing word boundaries. Enabling it changes the learned
    /// vocabulary, so it is off unless requested.
    pub skip_whitespace_pairs: bool,
    /// Minimum number of pair occurrences required before a merge is performed.
    pub min_frequency: usize,
    /// Hard cap on merge iterations, including iterations that reuse an existing id.
    ///
    /// `None` runs until the target vocabulary size or another stop condition is reached.
    pub max_merge_iterations: Option<usize>,
    /// Enables per-iteration logging through the `log` facade.
    pub show_progress: bool,
}

impl TrainerConfig {
    /// Returns a builder initialised with [`TrainerConfig::default`].
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::default()
    }

    /// Validates the invariants required for training.
    pub fn validate(&self) -> Result<()> {
        if self.target_vocab_size < BASE_VOCAB_SIZE {
            return Err(BpeError::InvalidConfig(format!(
                "target_vocab_size ({}) must be at least the {BASE_VOCAB_SIZE} base byte tokens",
                self.target_vocab_size
            )));
        }
        let max_vocab = usize::try_from(u32::MAX).unwrap_or(usize::MAX);
        if self.target_vocab_size > max_vocab {
            return Err(BpeError::InvalidConfig(format!(
                "target_vocab_size ({}) exceeds {max_vocab}, the maximum representable TokenId",
                self.target_vocab_size
            )));
        }
        if self.min_frequency == 0 {
            return Err(BpeError::InvalidConfig(
                "min_frequency must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Entries needed to grow the base alphabet to the target size, bounded by the iteration cap.
    #[must_use]
    pub fn merge_budget(&self) -> usize {
        let budget = self.target_vocab_size.saturating_sub(BASE_VOCAB_SIZE);
        match self.max_merge_iterations {
            Some(limit) => budget.min(limit),
            None => budget,
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            target_vocab_size: 2356,
            skip_whitespace_pairs: false,
            min_frequency: 1,
            max_merge_iterations: None,
            show_progress: true,
        }
    }
}

/// Builder for [`TrainerConfig`].
#[derive(Debug, Default, Clone)]
pub struct TrainerBuilder {
    cfg: TrainerConfig,
}

impl TrainerBuilder {
    /// Creates a builder with [`TrainerConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the desired vocabulary size (including base byte tokens).
    #[must_use]
    pub fn target_vocab_size(mut self, value: usize) -> Self {
        self.cfg.target_vocab_size = value;
        self
    }

    /// Excludes pairs ending in the space byte from counting.
    #[must_use]
    pub fn skip_whitespace_pairs(mut self, enabled: bool) -> Self {
        self.cfg.skip_whitespace_pairs = enabled;
        self
    }

    /// Sets the minimum merge frequency.
    #[must_use]
    pub fn min_frequency(mut self, value: usize) -> Self {
        self.cfg.min_frequency = value;
        self
    }

    /// Sets a hard merge iteration limit.
    #[must_use]
    pub fn max_merge_iterations(mut self, value: Option<usize>) -> Self {
        self.cfg.max_merge_iterations = value;
        self
    }

    /// Enables or disables per-iteration logging.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`TrainerConfig`].
    pub fn build(self) -> Result<TrainerConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Which characters count as whitespace when splitting input into word chunks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WhitespaceKind {
    /// ASCII space, tab, newline, carriage return and form feed.
    #[default]
    Ascii,
    /// Any Unicode `White_Space` character decoded from UTF-8.
    Unicode,
}

/// Configuration for the longest-match encoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Segments each whitespace-led word chunk independently so no token spans a word boundary.
    pub preserve_word_boundaries: bool,
    /// Whitespace classification used by word chunking.
    pub whitespace: WhitespaceKind,
}

impl EncoderConfig {
    /// Returns a builder initialised with [`EncoderConfig::default`].
    #[must_use]
    pub fn builder() -> EncoderBuilder {
        EncoderBuilder::default()
    }
}

/// Builder for [`EncoderConfig`].
#[derive(Debug, Default, Clone)]
pub struct EncoderBuilder {
    cfg: EncoderConfig,
}

impl EncoderBuilder {
    /// Enables or disables per-word segmentation.
    #[must_use]
    pub fn preserve_word_boundaries(mut self, enabled: bool) -> Self {
        self.cfg.preserve_word_boundaries = enabled;
        self
    }

    /// Selects the whitespace classification for word chunking.
    #[must_use]
    pub fn whitespace(mut self, kind: WhitespaceKind) -> Self {
        self.cfg.whitespace = kind;
        self
    }

    /// Finalises the builder.
    pub fn build(self) -> EncoderConfig {
        self.cfg
    }
}

/// Configuration controlling how corpora are read from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestConfig {
    /// Enables recursive directory traversal.
    pub recursive: bool,
    /// Follows symlinks encountered during traversal.
    pub follow_symlinks: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
        }
    }
}

impl IngestConfig {
    /// Returns a builder initialised with [`IngestConfig::default`].
    #[must_use]
    pub fn builder() -> IngestBuilder {
        IngestBuilder::default()
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug, Default, Clone)]
pub struct IngestBuilder {
    cfg: IngestConfig,
}

impl IngestBuilder {
    /// Enables or disables recursive directory traversal.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when traversing directories.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Finalises the builder, returning the [`IngestConfig`].
    pub fn build(self) -> IngestConfig {
        self.cfg
    }
}

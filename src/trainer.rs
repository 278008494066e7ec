//! Core training loop that grows a [`Vocabulary`] by repeated pair merges.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::config::{IngestConfig, TrainerBuilder, TrainerConfig};
use crate::corpus::load_corpus;
use crate::error::Result;
use crate::metrics::{sample_rss_kb, IterationMetrics, StopReason, TrainingMetrics};
use crate::vocab::{Pair, TokenId, Vocabulary, BASE_VOCAB_SIZE};

const SPACE_TOKEN: TokenId = b' ' as TokenId;

/// High-level façade configuring and executing BPE training runs.
#[derive(Debug, Clone)]
pub struct Trainer {
    cfg: TrainerConfig,
}

/// Artifacts returned after a training session completes.
#[must_use]
#[derive(Debug, Clone)]
pub struct TrainerArtifacts {
    /// Trained vocabulary.
    pub vocab: Vocabulary,
    /// Corpus token sequence after the final merge.
    pub tokens: Vec<TokenId>,
    /// Merged pairs in the order they were applied, with the id each was rewritten to.
    pub merges: Vec<(Pair, TokenId)>,
    /// Detailed metrics captured during training.
    pub metrics: TrainingMetrics,
}

impl Trainer {
    /// Creates a new trainer for the supplied configuration.
    #[must_use]
    pub fn new(cfg: TrainerConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`TrainerBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.cfg
    }

    /// Trains a vocabulary from files on disk, concatenated in discovery order.
    pub fn train_from_paths<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        ingest: &IngestConfig,
    ) -> Result<TrainerArtifacts> {
        let corpus = load_corpus(inputs, ingest)?;
        self.train(&corpus)
    }

    /// Trains a vocabulary from an in-memory corpus.
    ///
    /// An empty or single-byte corpus yields the bare base alphabet.
    pub fn train(&self, corpus: &[u8]) -> Result<TrainerArtifacts> {
        self.cfg.validate()?;

        let mut vocab = Vocabulary::new();
        vocab.initialize_base_alphabet()?;
        let mut tokens: Vec<TokenId> = corpus.iter().map(|&b| TokenId::from(b)).collect();

        let entries_to_add = self.cfg.target_vocab_size - BASE_VOCAB_SIZE;
        let capacity = self.cfg.merge_budget().min(16_384);
        let mut merges: Vec<(Pair, TokenId)> = Vec::with_capacity(capacity);
        let mut metrics = TrainingMetrics::new(capacity);
        let training_start = Instant::now();
        let mut iteration = 0usize;

        let stop_reason = loop {
            if vocab.merge_count() >= entries_to_add {
                break StopReason::TargetVocabReached;
            }
            // Reused ids still consume an iteration.
            if self.cfg.max_merge_iterations.is_some_and(|cap| iteration >= cap) {
                break StopReason::MaxIterationsReached;
            }
            if tokens.len() < 2 {
                break StopReason::NoEligiblePairs;
            }

            let iteration_start = Instant::now();
            let table = count_pairs(&tokens, self.cfg.skip_whitespace_pairs);
            let Some((best_pair, frequency)) = table.best() else {
                break StopReason::NoEligiblePairs;
            };
            if frequency < self.cfg.min_frequency {
                break StopReason::BelowMinFrequency;
            }

            let symbol = concat_symbols(&vocab, best_pair)?;
            let (new_token, minted) = mint_or_reuse(&mut vocab, symbol)?;
            let merges_applied = merge_pair(&mut tokens, best_pair, new_token);
            merges.push((best_pair, new_token));
            iteration += 1;

            if !minted {
                debug!(
                    "pair {:?} spells existing token {}; rewrote {} occurrences",
                    best_pair, new_token, merges_applied
                );
            }
            if self.cfg.show_progress {
                info!(
                    "iter {:>6} freq {:>8} merges {:>8} distinct_pairs {:>8} vocab {:>8}",
                    iteration,
                    frequency,
                    merges_applied,
                    table.distinct(),
                    vocab.size()
                );
            }

            metrics.iterations.push(IterationMetrics {
                iteration,
                pair: best_pair,
                best_frequency: frequency,
                merges_applied,
                distinct_pairs: table.distinct(),
                sequence_len: tokens.len(),
                elapsed_iteration: iteration_start.elapsed(),
                elapsed_total: training_start.elapsed(),
                rss_kb: sample_rss_kb(),
            });
        };

        metrics.stop_reason = stop_reason;
        metrics.total_duration = training_start.elapsed();

        if self.cfg.show_progress {
            info!(
                "completed {} merges in {:.2?}; vocab size {} ({:?})",
                vocab.merge_count(),
                metrics.total_duration,
                vocab.size(),
                stop_reason
            );
        }

        Ok(TrainerArtifacts {
            vocab,
            tokens,
            merges,
            metrics,
        })
    }
}

/// Adjacent pair occurrence counts for one scan of a token sequence.
#[derive(Debug, Clone, Default)]
pub struct PairTable {
    counts: FxHashMap<Pair, usize>,
    best: Option<(Pair, usize)>,
}

impl PairTable {
    /// Pair selected for merging together with its count.
    ///
    /// This is the first pair, in left-to-right scan order, whose running count rose strictly
    /// above every count seen before it. Among pairs that end with equal totals the one that
    /// reached that total earliest wins.
    #[must_use]
    pub fn best(&self) -> Option<(Pair, usize)> {
        self.best
    }

    /// Occurrence count of `pair`, zero when absent.
    #[must_use]
    pub fn count(&self, pair: Pair) -> usize {
        self.counts.get(&pair).copied().unwrap_or(0)
    }

    /// Number of distinct pairs counted.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }
}

/// Counts adjacent pairs in a single streaming pass, tracking the running maximum.
///
/// With `skip_whitespace_pairs`, pairs whose right token is the space byte are ignored.
#[must_use]
pub fn count_pairs(tokens: &[TokenId], skip_whitespace_pairs: bool) -> PairTable {
    let mut table = PairTable::default();
    let mut max_frequency = 0usize;
    for window in tokens.windows(2) {
        if skip_whitespace_pairs && window[1] == SPACE_TOKEN {
            continue;
        }
        let pair = (window[0], window[1]);
        let count = table.counts.entry(pair).or_insert(0);
        *count += 1;
        if *count > max_frequency {
            max_frequency = *count;
            table.best = Some((pair, max_frequency));
        }
    }
    table
}

/// Replaces every non-overlapping occurrence of `pair`, scanning left to right, with
/// `new_token`. Returns the number of replacements.
pub fn merge_pair(tokens: &mut Vec<TokenId>, pair: Pair, new_token: TokenId) -> usize {
    let input_len = tokens.len();
    let mut read = 0usize;
    let mut write = 0usize;
    let mut merges = 0usize;

    while read < input_len {
        if read + 1 < input_len && tokens[read] == pair.0 && tokens[read + 1] == pair.1 {
            tokens[write] = new_token;
            read += 2;
            merges += 1;
        } else {
            if write != read {
                tokens[write] = tokens[read];
            }
            read += 1;
        }
        write += 1;
    }

    tokens.truncate(write);
    merges
}

fn concat_symbols(vocab: &Vocabulary, pair: Pair) -> Result<Vec<u8>> {
    let left = vocab.lookup_symbol(pair.0)?;
    let right = vocab.lookup_symbol(pair.1)?;
    let mut symbol = Vec::with_capacity(left.len() + right.len());
    symbol.extend_from_slice(left);
    symbol.extend_from_slice(right);
    Ok(symbol)
}

/// Binds `symbol` to a fresh id, or returns the id it already has.
///
/// Two different pairs can spell the same bytes (`"a" + "bc"` and `"ab" + "c"`). The second
/// such merge reuses the first one's id so the store stays a bijection.
fn mint_or_reuse(vocab: &mut Vocabulary, symbol: Vec<u8>) -> Result<(TokenId, bool)> {
    match vocab.get_id(&symbol) {
        Some(existing) => Ok((existing, false)),
        None => Ok((vocab.add_entry(symbol)?, true)),
    }
}

impl fmt::Display for TrainerArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BPE vocabulary with {} entries", self.vocab.size())?;
        writeln!(f, "Merges: {}", self.vocab.merge_count())?;
        writeln!(f, "Stop reason: {:?}", self.metrics.stop_reason)?;
        writeln!(f, "Total duration: {:?}", self.metrics.total_duration)?;
        Ok(())
    }
}

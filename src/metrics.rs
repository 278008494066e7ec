//! Metrics describing the evolution of the training process.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::vocab::Pair;

/// Reason a training run terminated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// The configured target vocabulary size was reached.
    TargetVocabReached,
    /// The configured maximum merge iterations was reached.
    MaxIterationsReached,
    /// The token sequence had no countable adjacent pair left.
    NoEligiblePairs,
    /// The most frequent pair occurred fewer times than the configured minimum.
    BelowMinFrequency,
}

/// Metrics captured for each merge iteration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IterationMetrics {
    /// Sequential iteration number (1-indexed).
    pub iteration: usize,
    /// Pair merged during the iteration.
    pub pair: Pair,
    /// Occurrence count of the merged pair.
    pub best_frequency: usize,
    /// Non-overlapping occurrences replaced in the token sequence.
    pub merges_applied: usize,
    /// Count of distinct pairs observed during the scan.
    pub distinct_pairs: usize,
    /// Token sequence length after the rewrite.
    pub sequence_len: usize,
    /// Execution time for the iteration.
    pub elapsed_iteration: Duration,
    /// Total time elapsed since training started.
    pub elapsed_total: Duration,
    /// Resident set size sample captured from `/proc/self/status` on Linux.
    pub rss_kb: Option<usize>,
}

/// Aggregate metrics produced by a training session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    /// Per-iteration snapshots accrued during training.
    pub iterations: Vec<IterationMetrics>,
    /// Total duration of the training session.
    pub total_duration: Duration,
    /// Reason training terminated.
    pub stop_reason: StopReason,
}

impl TrainingMetrics {
    /// Creates an empty metrics container with pre-allocated capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            iterations: Vec::with_capacity(capacity),
            total_duration: Duration::ZERO,
            stop_reason: StopReason::TargetVocabReached,
        }
    }
}

/// Resident set size in kilobytes, read from the `VmRSS` line of `/proc/self/status`.
///
/// Returns `None` off Linux or when the file cannot be read.
#[must_use]
pub fn sample_rss_kb() -> Option<usize> {
    if !cfg!(target_os = "linux") {
        return None;
    }
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse().ok())
}

//! Bounded rolling history of validation outcomes.
//!
//! The only long-lived mutable state in the subsystem. The orchestrator
//! funnels every completed validation through a single writer lock into
//! this buffer, which retains the most recent entries (50 by default,
//! oldest evicted first) and answers aggregate statistics queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::types::{ValidationResult, ValidationStatus, ValidationTier};

/// Default number of entries retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Minimum entries before aggregate statistics are meaningful.
const MIN_STATISTICS_SAMPLES: usize = 5;

// =========================================================================
// Entries
// =========================================================================

/// Summary of one completed validation.
///
/// Only summary fields are retained; the full result is discarded by the
/// caller after use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Tier the validation ran at.
    pub tier: ValidationTier,
    /// Final verdict.
    pub status: ValidationStatus,
    /// Blended consensus score.
    pub consensus_score: f64,
    /// Structural validator's score.
    pub structural_score: f64,
    /// Solver-compatibility validator's score.
    pub solver_score: f64,
    /// Confidence (equal to the consensus score by convention).
    pub confidence: f64,
    /// Wall-clock execution time in milliseconds.
    pub execution_time_ms: f64,
    /// Number of issues surfaced.
    pub issue_count: usize,
    /// When the validation completed.
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Summarize a completed result.
    pub fn summarize(result: &ValidationResult, execution_time_ms: f64) -> Self {
        Self {
            tier: result.tier,
            status: result.status,
            consensus_score: result.consensus_score,
            structural_score: result.structural_score,
            solver_score: result.solver_score,
            confidence: result.confidence,
            execution_time_ms,
            issue_count: result.issues.len(),
            timestamp: result.timestamp,
        }
    }
}

// =========================================================================
// Statistics
// =========================================================================

/// Aggregate statistics over the retained history.
///
/// Serializes either as the `{"status": "insufficient_data"}` sentinel or
/// as the full aggregate record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValidationStatistics {
    /// Fewer than 5 validations recorded so far.
    InsufficientData {
        /// Always `"insufficient_data"`.
        status: &'static str,
    },
    /// Aggregates over the most recent entries.
    Aggregate(AggregateStatistics),
}

impl ValidationStatistics {
    /// The sentinel returned below the sample minimum.
    pub fn insufficient() -> Self {
        Self::InsufficientData {
            status: "insufficient_data",
        }
    }
}

/// Averages and distributions over the retained history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStatistics {
    /// Number of entries aggregated.
    pub total_validations: usize,
    /// Mean consensus score.
    pub average_consensus_score: f64,
    /// Mean structural score.
    pub average_structural_score: f64,
    /// Mean solver score.
    pub average_solver_score: f64,
    /// Mean confidence.
    pub average_confidence: f64,
    /// Mean execution time in milliseconds.
    pub average_execution_time: f64,
    /// Fraction of entries per status label.
    pub status_distribution: BTreeMap<String, f64>,
    /// Fraction of entries per tier label.
    pub tier_distribution: BTreeMap<String, f64>,
}

// =========================================================================
// ValidationHistory
// =========================================================================

/// Bounded buffer of validation summaries, oldest evicted first.
#[derive(Debug, Clone)]
pub struct ValidationHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for ValidationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ValidationHistory {
    /// Create a history retaining at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when over capacity.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all retained entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Aggregate statistics over the retained entries, or the
    /// insufficient-data sentinel below the sample minimum.
    pub fn statistics(&self) -> ValidationStatistics {
        let n = self.entries.len();
        if n < MIN_STATISTICS_SAMPLES {
            return ValidationStatistics::insufficient();
        }

        let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut tier_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut sums = [0.0f64; 5];

        for entry in &self.entries {
            sums[0] += entry.consensus_score;
            sums[1] += entry.structural_score;
            sums[2] += entry.solver_score;
            sums[3] += entry.confidence;
            sums[4] += entry.execution_time_ms;
            *status_counts.entry(entry.status.as_str().to_string()).or_default() += 1;
            *tier_counts.entry(entry.tier.as_str().to_string()).or_default() += 1;
        }

        let as_fractions = |counts: BTreeMap<String, usize>| -> BTreeMap<String, f64> {
            counts
                .into_iter()
                .map(|(label, count)| (label, count as f64 / n as f64))
                .collect()
        };

        ValidationStatistics::Aggregate(AggregateStatistics {
            total_validations: n,
            average_consensus_score: sums[0] / n as f64,
            average_structural_score: sums[1] / n as f64,
            average_solver_score: sums[2] / n as f64,
            average_confidence: sums[3] / n as f64,
            average_execution_time: sums[4] / n as f64,
            status_distribution: as_fractions(status_counts),
            tier_distribution: as_fractions(tier_counts),
        })
    }
}

//! Validator trait and the built-in scoring perspectives.
//!
//! Each validator scores the same immutable [`ModelStructure`] from one
//! perspective and returns a [`ValidatorVerdict`]. The orchestrator and the
//! consensus builder depend only on [`ModelValidator`], so new perspectives
//! (for the premium tier) can be added without touching consensus logic.
//!
//! Validators are pure computation over in-memory data: no I/O, no shared
//! mutable state, safe to run as concurrent tasks.

mod solver;
mod structural;

pub use solver::{SolverCompatibilityValidator, SolverLimits};
pub use structural::StructuralValidator;

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Issue, ModelStructure, Recommendation, ValidatorKind};

/// What a single validator produced: a score in [0.0, 1.0] plus the issues
/// and recommendations generated alongside it.
#[derive(Debug, Clone, Default)]
pub struct ValidatorVerdict {
    /// Score in [0.0, 1.0]. Starts at 1.0 and is only multiplied downward
    /// by penalty factors in (0, 1).
    pub score: f64,
    /// Issues found, in discovery order, not yet deduplicated.
    pub issues: Vec<Issue>,
    /// Recommendations generated alongside specific issues.
    pub recommendations: Vec<Recommendation>,
}

/// A single scoring perspective over a [`ModelStructure`].
#[async_trait]
pub trait ModelValidator: Send + Sync {
    /// Stable name for this validator, used in reports and logs.
    fn name(&self) -> &str;

    /// Which consensus weighting group this validator belongs to.
    fn kind(&self) -> ValidatorKind;

    /// Score the model from this validator's perspective.
    ///
    /// # Errors
    ///
    /// An error here is a ValidatorFault: the orchestrator converts it into
    /// a 0.0-score degraded contribution rather than aborting the request.
    async fn evaluate(&self, model: &ModelStructure) -> CoreResult<ValidatorVerdict>;
}

/// Running score accumulator shared by the built-in validators.
///
/// Enforces the score invariant: starts at 1.0, every applied factor must
/// lie in (0, 1), and the result is clamped to [0.0, 1.0].
#[derive(Debug, Clone)]
pub(crate) struct ScoreTracker {
    score: f64,
}

impl ScoreTracker {
    pub(crate) fn new() -> Self {
        Self { score: 1.0 }
    }

    /// Multiply the running score by a penalty factor in (0, 1).
    pub(crate) fn penalize(&mut self, factor: f64) {
        debug_assert!(factor > 0.0 && factor < 1.0, "penalty factor out of (0,1)");
        self.score *= factor;
    }

    pub(crate) fn value(&self) -> f64 {
        self.score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_tracker_starts_at_one() {
        assert_eq!(ScoreTracker::new().value(), 1.0);
    }

    #[test]
    fn test_score_tracker_compounds_penalties() {
        let mut tracker = ScoreTracker::new();
        tracker.penalize(0.5);
        tracker.penalize(0.5);
        assert!((tracker.value() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_score_tracker_never_leaves_unit_interval() {
        let mut tracker = ScoreTracker::new();
        for _ in 0..200 {
            tracker.penalize(0.1);
        }
        let score = tracker.value();
        assert!((0.0..=1.0).contains(&score));
    }
}

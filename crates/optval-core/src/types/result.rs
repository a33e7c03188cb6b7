//! Validation verdict types.
//!
//! [`ValidationResult`] is the engine's sole output type. Issues and
//! recommendations carry a structured severity/kind tag attached at the
//! point they are generated; the wire-level `issues` / `recommendations`
//! fields flatten to plain strings while `details` retains the structured
//! forms for audit and debugging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =========================================================================
// Status / tier enums
// =========================================================================

/// Final verdict of a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Validators completed and found the model acceptable.
    Valid,
    /// Validators completed and found the model unacceptable.
    Invalid,
    /// Usable but below the acceptance bar; fix the listed issues.
    NeedsImprovement,
    /// The validation engine itself could not complete. Distinct from
    /// `Invalid`: here nothing useful can be said about the model.
    Uncertain,
}

impl ValidationStatus {
    /// Stable wire label for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
            ValidationStatus::NeedsImprovement => "needs_improvement",
            ValidationStatus::Uncertain => "uncertain",
        }
    }
}

/// Validation depth/cost setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationTier {
    /// Single averaged pass: both validator scores, simple mean, no
    /// agreement computation, no prioritization filtering.
    Basic,
    /// Full two-validator weighted consensus.
    Standard,
    /// N-validator consensus with minimum pairwise agreement.
    Premium,
}

impl ValidationTier {
    /// Stable wire label for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationTier::Basic => "basic",
            ValidationTier::Standard => "standard",
            ValidationTier::Premium => "premium",
        }
    }
}

// =========================================================================
// Issues and recommendations
// =========================================================================

/// Severity attached to an issue at the point it is generated.
///
/// Prioritization in the consensus builder is driven by this tag rather
/// than substring matching on free-text messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Breaks the model outright (undefined references, duplicates,
    /// placeholder values, missing sections).
    Critical,
    /// Wrong but locally repairable (bad types, count mismatches, limits).
    Major,
    /// Cosmetic or advisory.
    Minor,
}

/// A single human-readable defect found by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    /// Human-readable description.
    pub message: String,
    /// Severity tag attached at creation time.
    pub severity: Severity,
}

impl Issue {
    /// Build a critical issue.
    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Critical,
        }
    }

    /// Build a major issue.
    pub fn major(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Major,
        }
    }

    /// Build a minor issue.
    pub fn minor(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Minor,
        }
    }
}

/// Whether a recommendation is a required fix or an optional improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    /// The model cannot be solved correctly without this change.
    Required,
    /// The model would be better (faster, stabler) with this change.
    Advisory,
}

/// A suggested action accompanying an issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recommendation {
    /// Human-readable suggestion.
    pub message: String,
    /// Required fix vs. optional improvement.
    pub kind: RecommendationKind,
}

impl Recommendation {
    /// Build a required-fix recommendation.
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: RecommendationKind::Required,
        }
    }

    /// Build an advisory recommendation.
    pub fn advisory(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: RecommendationKind::Advisory,
        }
    }
}

// =========================================================================
// Per-validator reporting
// =========================================================================

/// Which scoring perspective a validator represents.
///
/// Drives the consensus weighting: structural-kind validators share the
/// 0.6 aggregate weight, solver-kind validators share the 0.4 aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorKind {
    /// Model-authoring correctness.
    Structural,
    /// Solver consumability (format, stability, problem size).
    Solver,
}

/// What a single validator returned, retained in `details` for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorReport {
    /// Validator name (e.g. `structural`, `solver_compatibility`).
    pub name: String,
    /// Which perspective this validator scores.
    pub kind: ValidatorKind,
    /// Raw score in [0.0, 1.0].
    pub score: f64,
    /// Structured issues as generated.
    pub issues: Vec<Issue>,
    /// Structured recommendations as generated.
    pub recommendations: Vec<Recommendation>,
    /// Wall-clock time this validator took.
    pub elapsed_ms: f64,
    /// True when this contribution is a ValidatorFault or timeout converted
    /// to a 0.0 score. Degradation stays visible here instead of being
    /// silently hidden.
    pub degraded: bool,
}

/// Nested audit record retained on every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationDetails {
    /// Request id assigned by the orchestrator.
    pub request_id: Uuid,
    /// Tier this validation ran at.
    pub tier: ValidationTier,
    /// Agreement level across validators. `None` for the basic tier, which
    /// skips agreement computation.
    pub agreement_level: Option<f64>,
    /// Each validator's raw output.
    pub validators: Vec<ValidatorReport>,
}

// =========================================================================
// ValidationResult
// =========================================================================

/// The engine's sole output type.
///
/// Every score starts at 1.0 inside the validators and is only multiplied
/// downward by penalty factors in (0, 1), so all scores lie in [0.0, 1.0].
/// `issues` and `recommendations` are never null; empty means clean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Final verdict.
    pub status: ValidationStatus,
    /// Blended confidence score in [0.0, 1.0].
    pub consensus_score: f64,
    /// Structural validator's score.
    pub structural_score: f64,
    /// Solver-compatibility validator's score.
    pub solver_score: f64,
    /// Deduplicated, prioritized issue messages.
    pub issues: Vec<String>,
    /// Deduplicated, prioritized recommendation messages.
    pub recommendations: Vec<String>,
    /// Equal to `consensus_score` by convention.
    pub confidence: f64,
    /// Tier this validation ran at.
    pub tier: ValidationTier,
    /// Instant of completion.
    pub timestamp: DateTime<Utc>,
    /// Per-validator raw outputs plus agreement level, for audit.
    pub details: ValidationDetails,
}

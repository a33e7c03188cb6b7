//! Solver-compatibility validator: can a numeric solver consume this?
//!
//! Independent of whether the model is "correct" as authored: this
//! perspective scores format compatibility, numerical stability, and
//! execution feasibility. A semantically fine model with 10^12-scale
//! coefficients or a million variables still deserves a poor score here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ModelValidator, ScoreTracker, ValidatorVerdict};
use crate::error::CoreResult;
use crate::types::{Issue, ModelStructure, Recommendation, ValidatorKind};

// =========================================================================
// Penalty factors
// =========================================================================

/// Variable type a solver does not understand.
const UNKNOWN_TYPE_PENALTY: f64 = 0.8;
/// Non-numeric constraint coefficient (per occurrence).
const NON_NUMERIC_COEFFICIENT_PENALTY: f64 = 0.7;
/// Coefficient magnitude above the stability limit (per occurrence).
const HUGE_COEFFICIENT_PENALTY: f64 = 0.8;
/// Too many fully unbounded variables.
const UNBOUNDED_VARIABLES_PENALTY: f64 = 0.9;
/// Variable or constraint count above the feasibility limit.
const PROBLEM_SIZE_PENALTY: f64 = 0.8;
/// Constraint-to-variable ratio above the over-constraint limit.
const OVERCONSTRAINED_PENALTY: f64 = 0.9;

// =========================================================================
// Limits
// =========================================================================

/// Tunable numeric limits for the solver-compatibility checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverLimits {
    /// Coefficients above this absolute value are a stability hazard.
    pub max_coefficient_magnitude: f64,
    /// Fraction of fully unbounded variables above which bounds are
    /// recommended.
    pub max_unbounded_fraction: f64,
    /// Variable count above which decomposition is recommended.
    pub max_variables: usize,
    /// Constraint count above which aggregation is recommended.
    pub max_constraints: usize,
    /// Constraint-to-variable ratio above which the model looks
    /// over-constrained (possible infeasibility signal).
    pub max_constraint_ratio: f64,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_coefficient_magnitude: 1e10,
            max_unbounded_fraction: 0.8,
            max_variables: 10_000,
            max_constraints: 10_000,
            max_constraint_ratio: 10.0,
        }
    }
}

// =========================================================================
// SolverCompatibilityValidator
// =========================================================================

/// Scores the model from the perspective of solver consumability.
#[derive(Debug, Clone, Default)]
pub struct SolverCompatibilityValidator {
    limits: SolverLimits,
}

impl SolverCompatibilityValidator {
    /// Create a validator with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom limits.
    pub fn with_limits(limits: SolverLimits) -> Self {
        Self { limits }
    }

    /// Format compatibility: types and coefficient shapes a solver accepts.
    fn check_format(&self, model: &ModelStructure, out: &mut StageOutput) {
        for variable in &model.variables {
            if !variable.has_known_type() {
                out.tracker.penalize(UNKNOWN_TYPE_PENALTY);
                out.issues.push(Issue::major(format!(
                    "variable '{}' has type '{}' no solver accepts",
                    variable.name, variable.var_type
                )));
                out.recommendations.push(Recommendation::required(format!(
                    "fix variable '{}' to a solver-supported type",
                    variable.name
                )));
            }
        }

        for constraint in &model.constraints {
            for coefficient in &constraint.coefficients {
                if !coefficient.is_number() {
                    out.tracker.penalize(NON_NUMERIC_COEFFICIENT_PENALTY);
                    out.issues.push(Issue::major(format!(
                        "constraint '{}' has non-numeric coefficient {}",
                        constraint.name, coefficient
                    )));
                }
            }
        }
    }

    /// Numerical stability: coefficient magnitudes and bound coverage.
    fn check_stability(&self, model: &ModelStructure, out: &mut StageOutput) {
        let limit = self.limits.max_coefficient_magnitude;
        for (owner, coefficient) in all_coefficients(model) {
            if let Some(value) = coefficient.as_f64() {
                if value.abs() > limit {
                    out.tracker.penalize(HUGE_COEFFICIENT_PENALTY);
                    out.issues.push(Issue::major(format!(
                        "{} has coefficient {:e} beyond the stability limit",
                        owner, value
                    )));
                    out.recommendations.push(Recommendation::advisory(format!(
                        "consider rescaling {} to keep coefficients within |{:e}|",
                        owner, limit
                    )));
                }
            }
        }

        if !model.variables.is_empty() {
            let unbounded = model.variables.iter().filter(|v| v.is_unbounded()).count();
            let fraction = unbounded as f64 / model.variables.len() as f64;
            if fraction > self.limits.max_unbounded_fraction {
                out.tracker.penalize(UNBOUNDED_VARIABLES_PENALTY);
                out.issues.push(Issue::minor(format!(
                    "{unbounded} of {} variables are fully unbounded",
                    model.variables.len()
                )));
                out.recommendations.push(Recommendation::advisory(
                    "consider adding reasonable bounds to most variables",
                ));
            }
        }
    }

    /// Execution feasibility: problem size within what a solver can take.
    fn check_feasibility(&self, model: &ModelStructure, out: &mut StageOutput) {
        let variables = model.variables.len();
        let constraints = model.constraints.len();

        if variables > self.limits.max_variables {
            out.tracker.penalize(PROBLEM_SIZE_PENALTY);
            out.issues.push(Issue::major(format!(
                "{variables} variables exceed the {} feasibility limit",
                self.limits.max_variables
            )));
            out.recommendations.push(Recommendation::advisory(
                "consider decomposition or variable aggregation to shrink the problem",
            ));
        }

        if constraints > self.limits.max_constraints {
            out.tracker.penalize(PROBLEM_SIZE_PENALTY);
            out.issues.push(Issue::major(format!(
                "{constraints} constraints exceed the {} feasibility limit",
                self.limits.max_constraints
            )));
            out.recommendations.push(Recommendation::advisory(
                "consider aggregating or relaxing constraints to shrink the problem",
            ));
        }

        if variables > 0 {
            let ratio = constraints as f64 / variables as f64;
            if ratio > self.limits.max_constraint_ratio {
                out.tracker.penalize(OVERCONSTRAINED_PENALTY);
                out.issues.push(Issue::minor(format!(
                    "constraint-to-variable ratio {ratio:.1} suggests over-constraint"
                )));
                out.recommendations.push(Recommendation::advisory(
                    "consider reviewing constraints for redundancy; the model may be infeasible",
                ));
            }
        }
    }
}

#[async_trait]
impl ModelValidator for SolverCompatibilityValidator {
    fn name(&self) -> &str {
        "solver_compatibility"
    }

    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Solver
    }

    async fn evaluate(&self, model: &ModelStructure) -> CoreResult<ValidatorVerdict> {
        let mut out = StageOutput::new();
        self.check_format(model, &mut out);
        self.check_stability(model, &mut out);
        self.check_feasibility(model, &mut out);
        Ok(out.into_verdict())
    }
}

struct StageOutput {
    tracker: ScoreTracker,
    issues: Vec<Issue>,
    recommendations: Vec<Recommendation>,
}

impl StageOutput {
    fn new() -> Self {
        Self {
            tracker: ScoreTracker::new(),
            issues: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    fn into_verdict(self) -> ValidatorVerdict {
        ValidatorVerdict {
            score: self.tracker.value(),
            issues: self.issues,
            recommendations: self.recommendations,
        }
    }
}

/// All coefficients in the model, with a label naming their owner.
fn all_coefficients(model: &ModelStructure) -> impl Iterator<Item = (String, &Value)> {
    let constraint_coeffs = model.constraints.iter().flat_map(|c| {
        c.coefficients
            .iter()
            .map(move |v| (format!("constraint '{}'", c.name), v))
    });
    let objective_coeffs = model
        .objective
        .coefficients
        .iter()
        .map(|v| ("the objective".to_string(), v));
    constraint_coeffs.chain(objective_coeffs)
}

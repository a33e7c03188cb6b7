//! Structural validator: model-authoring correctness.
//!
//! Scores internal consistency and completeness of the model as authored,
//! independent of any solver. Five stages each multiply the running score by
//! stage-local penalty factors; a fail-fast gate after the critical stage
//! short-circuits the rest when the model is already beyond repair.
//!
//! The completeness stage deliberately re-checks what stages 2-4 already
//! penalized, so a model missing multiple sections compounds its penalties.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use super::{ModelValidator, ScoreTracker, ValidatorVerdict};
use crate::error::CoreResult;
use crate::types::{
    Issue, ModelStructure, Recommendation, ValidatorKind, KNOWN_VARIABLE_TYPES,
};

// =========================================================================
// Penalty factors
// =========================================================================

/// Undefined variable reference in a constraint (critical stage).
const UNDEFINED_REFERENCE_PENALTY: f64 = 0.1;
/// Placeholder-looking text in a constraint rhs.
const PLACEHOLDER_RHS_PENALTY: f64 = 0.2;
/// Fewer than two constraints.
const INSUFFICIENT_CONSTRAINTS_PENALTY: f64 = 0.3;
/// Running score below this after the critical stage short-circuits.
const FAIL_FAST_THRESHOLD: f64 = 0.3;

/// Duplicate variable name. More severe than other variable defects since
/// it breaks referential integrity everywhere the name is used.
const DUPLICATE_NAME_PENALTY: f64 = 0.5;
/// Unknown variable type.
const UNKNOWN_TYPE_PENALTY: f64 = 0.9;
/// Malformed bounds.
const MALFORMED_BOUNDS_PENALTY: f64 = 0.9;
/// No variables at all.
const NO_VARIABLES_PENALTY: f64 = 0.3;

/// Constraint references an undeclared variable (per occurrence).
const CONSTRAINT_UNDECLARED_PENALTY: f64 = 0.8;
/// Coefficient count differs from reference count.
const COUNT_MISMATCH_PENALTY: f64 = 0.7;
/// Non-numeric rhs.
const NON_NUMERIC_RHS_PENALTY: f64 = 0.9;
/// No constraints at all.
const NO_CONSTRAINTS_PENALTY: f64 = 0.5;

/// Absent objective.
const NO_OBJECTIVE_PENALTY: f64 = 0.3;
/// Objective sense not minimize/maximize, or undefined objective reference.
const OBJECTIVE_DEFECT_PENALTY: f64 = 0.8;
/// Objective coefficient/variable count mismatch.
const OBJECTIVE_COUNT_MISMATCH_PENALTY: f64 = 0.7;

/// Literal tokens that mark a right-hand side as generated placeholder text.
const PLACEHOLDER_TOKENS: [&str; 4] = ["placeholder", "1", "coefficient", "rhs"];

// =========================================================================
// StructuralValidator
// =========================================================================

/// Scores the model from the perspective of model-authoring correctness.
///
/// # Examples
///
/// ```rust
/// use optval_core::validators::{ModelValidator, StructuralValidator};
/// use optval_core::types::ModelStructure;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let validator = StructuralValidator::new();
/// let verdict = validator.evaluate(&ModelStructure::default()).await.unwrap();
/// assert!(verdict.score < 0.3, "empty model scores near zero");
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    /// Create a structural validator.
    pub fn new() -> Self {
        Self
    }

    /// Stage 1: fail-fast critical structural check.
    ///
    /// Returns true when the remaining stages should be skipped.
    fn check_critical(&self, model: &ModelStructure, out: &mut StageOutput) -> bool {
        let declared = model.declared_names();

        for constraint in &model.constraints {
            for reference in constraint.undefined_references(&declared) {
                out.tracker.penalize(UNDEFINED_REFERENCE_PENALTY);
                out.issues.push(Issue::critical(format!(
                    "constraint '{}' references undefined variable '{}'",
                    constraint.name, reference
                )));
                out.recommendations.push(Recommendation::required(format!(
                    "fix constraint '{}': declare variable '{}' or correct the reference",
                    constraint.name, reference
                )));
            }

            if is_placeholder_rhs(&constraint.rhs) {
                out.tracker.penalize(PLACEHOLDER_RHS_PENALTY);
                out.issues.push(Issue::critical(format!(
                    "constraint '{}' has placeholder right-hand side {}",
                    constraint.name, constraint.rhs
                )));
                out.recommendations.push(Recommendation::required(format!(
                    "fix constraint '{}': replace the placeholder rhs with a real value",
                    constraint.name
                )));
            }
        }

        if model.constraints.len() < 2 {
            out.tracker.penalize(INSUFFICIENT_CONSTRAINTS_PENALTY);
            out.issues
                .push(Issue::critical("insufficient constraints for optimization"));
        }

        out.tracker.value() < FAIL_FAST_THRESHOLD
    }

    /// Stage 2: per-variable validation.
    fn check_variables(&self, model: &ModelStructure, out: &mut StageOutput) {
        if model.variables.is_empty() {
            out.tracker.penalize(NO_VARIABLES_PENALTY);
            out.issues.push(Issue::critical("model defines no variables"));
            return;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for variable in &model.variables {
            if !seen.insert(variable.name.as_str()) {
                out.tracker.penalize(DUPLICATE_NAME_PENALTY);
                out.issues.push(Issue::critical(format!(
                    "duplicate variable name '{}'",
                    variable.name
                )));
            }

            if !variable.has_known_type() {
                out.tracker.penalize(UNKNOWN_TYPE_PENALTY);
                out.issues.push(Issue::major(format!(
                    "variable '{}' has unknown type '{}'",
                    variable.name, variable.var_type
                )));
                out.recommendations.push(Recommendation::required(format!(
                    "fix variable '{}': use a valid type ({})",
                    variable.name,
                    KNOWN_VARIABLE_TYPES.join(", ")
                )));
            }

            if !variable.has_well_formed_bounds() {
                out.tracker.penalize(MALFORMED_BOUNDS_PENALTY);
                out.issues.push(Issue::major(format!(
                    "variable '{}' has malformed bounds",
                    variable.name
                )));
                out.recommendations.push(Recommendation::required(format!(
                    "fix bounds for '{}': use the [lower, upper] form",
                    variable.name
                )));
            }
        }
    }

    /// Stage 3: per-constraint validation.
    fn check_constraints(&self, model: &ModelStructure, out: &mut StageOutput) {
        if model.constraints.is_empty() {
            out.tracker.penalize(NO_CONSTRAINTS_PENALTY);
            out.issues.push(Issue::major("model defines no constraints"));
            return;
        }

        let declared = model.declared_names();
        for constraint in &model.constraints {
            for reference in constraint.undefined_references(&declared) {
                out.tracker.penalize(CONSTRAINT_UNDECLARED_PENALTY);
                out.issues.push(Issue::major(format!(
                    "constraint '{}' uses undeclared variable '{}'",
                    constraint.name, reference
                )));
            }

            if constraint.coefficients.len() != constraint.variables.len() {
                out.tracker.penalize(COUNT_MISMATCH_PENALTY);
                out.issues.push(Issue::major(format!(
                    "constraint '{}' has {} coefficients for {} variables",
                    constraint.name,
                    constraint.coefficients.len(),
                    constraint.variables.len()
                )));
                out.recommendations.push(Recommendation::required(format!(
                    "fix constraint '{}': supply one coefficient per referenced variable",
                    constraint.name
                )));
            }

            if !constraint.rhs.is_number() {
                out.tracker.penalize(NON_NUMERIC_RHS_PENALTY);
                out.issues.push(Issue::major(format!(
                    "constraint '{}' has non-numeric right-hand side",
                    constraint.name
                )));
            }
        }
    }

    /// Stage 4: objective validation.
    fn check_objective(&self, model: &ModelStructure, out: &mut StageOutput) {
        if !model.objective.present {
            out.tracker.penalize(NO_OBJECTIVE_PENALTY);
            out.issues.push(Issue::critical("model has no objective"));
            return;
        }

        let objective = &model.objective;
        if !objective.has_known_type() {
            out.tracker.penalize(OBJECTIVE_DEFECT_PENALTY);
            out.issues.push(Issue::major(format!(
                "objective has unknown type '{}'",
                objective.obj_type
            )));
            out.recommendations.push(Recommendation::required(
                "fix the objective type: use minimize or maximize",
            ));
        }

        let declared = model.declared_names();
        for reference in objective
            .variables
            .iter()
            .filter(|name| !declared.contains(name.as_str()))
        {
            out.tracker.penalize(OBJECTIVE_DEFECT_PENALTY);
            out.issues.push(Issue::major(format!(
                "objective references undefined variable '{}'",
                reference
            )));
        }

        if objective.coefficients.len() != objective.variables.len() {
            out.tracker.penalize(OBJECTIVE_COUNT_MISMATCH_PENALTY);
            out.issues.push(Issue::major(format!(
                "objective has {} coefficients for {} variables",
                objective.coefficients.len(),
                objective.variables.len()
            )));
            out.recommendations.push(Recommendation::required(
                "fix the objective: supply one coefficient per referenced variable",
            ));
        }
    }

    /// Stage 5: completeness validation.
    ///
    /// Re-checks section presence independently of stages 2-4 so a model
    /// missing multiple sections is penalized compounding, not just once.
    fn check_completeness(&self, model: &ModelStructure, out: &mut StageOutput) {
        if model.variables.is_empty() {
            out.tracker.penalize(NO_VARIABLES_PENALTY);
            out.issues
                .push(Issue::critical("incomplete model: variables section is empty"));
        }
        if model.constraints.is_empty() {
            out.tracker.penalize(NO_CONSTRAINTS_PENALTY);
            out.issues
                .push(Issue::major("incomplete model: constraints section is empty"));
        }
        if !model.objective.present {
            out.tracker.penalize(NO_OBJECTIVE_PENALTY);
            out.issues
                .push(Issue::critical("incomplete model: objective is missing"));
        }
    }
}

#[async_trait]
impl ModelValidator for StructuralValidator {
    fn name(&self) -> &str {
        "structural"
    }

    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Structural
    }

    async fn evaluate(&self, model: &ModelStructure) -> CoreResult<ValidatorVerdict> {
        let mut out = StageOutput::new();

        if self.check_critical(model, &mut out) {
            debug!(
                score = out.tracker.value(),
                issues = out.issues.len(),
                "structural fail-fast triggered, skipping stages 2-5"
            );
            return Ok(out.into_verdict());
        }

        self.check_variables(model, &mut out);
        self.check_constraints(model, &mut out);
        self.check_objective(model, &mut out);
        self.check_completeness(model, &mut out);

        Ok(out.into_verdict())
    }
}

/// Accumulator threaded through the stages.
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

/// Whether a right-hand side looks like generated placeholder text.
///
/// Matches the literal tokens a generation stage leaves behind: the word
/// "placeholder", a bare "1" as a string, or field names echoed as values.
fn is_placeholder_rhs(rhs: &Value) -> bool {
    match rhs.as_str() {
        Some(text) => {
            let normalized = text.trim().to_ascii_lowercase();
            PLACEHOLDER_TOKENS.contains(&normalized.as_str())
        }
        None => false,
    }
}

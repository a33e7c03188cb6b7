//! Validation Orchestrator: the engine's entry point.
//!
//! `validate()` drives extraction, runs the validators as concurrent tasks
//! joined under a per-request timeout, invokes the consensus builder for
//! the selected tier, records the outcome into the bounded rolling history,
//! and NEVER raises to its caller: every failure mode comes back encoded in
//! the returned [`ValidationResult`].
//!
//! All tiers run both built-in validators (the basic tier needs both scores
//! for its arithmetic mean; what it skips is the consensus builder, not the
//! solver perspective). The premium tier additionally runs any extra
//! validators registered via [`ValidationOrchestrator::with_validator`].

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::consensus::{ConsensusBuilder, ConsensusOutcome};
use crate::error::{CoreError, CoreResult};
use crate::extract::extract_structure;
use crate::history::{HistoryEntry, ValidationHistory, ValidationStatistics};
use crate::types::{
    Issue, ModelStructure, Recommendation, ValidationDetails, ValidationResult, ValidationStatus,
    ValidationTier, ValidatorKind, ValidatorReport,
};
use crate::validators::{ModelValidator, SolverCompatibilityValidator, StructuralValidator};

/// Number of built-in validators (structural + solver-compatibility).
const BUILTIN_VALIDATORS: usize = 2;

/// Entry point for consensus validation.
///
/// # Examples
///
/// ```rust
/// use optval_core::orchestrator::ValidationOrchestrator;
/// use optval_core::types::ValidationTier;
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let orchestrator = ValidationOrchestrator::new();
/// let result = orchestrator
///     .validate(&json!({}), ValidationTier::Standard)
///     .await;
/// // An empty model is invalid, but validate() itself never fails.
/// assert!(!result.issues.is_empty());
/// # }
/// ```
pub struct ValidationOrchestrator {
    config: Config,
    consensus: ConsensusBuilder,
    /// Built-in validators first, extra premium perspectives after.
    validators: Vec<Arc<dyn ModelValidator>>,
    /// The only long-lived mutable state; single-writer via the lock.
    history: Arc<RwLock<ValidationHistory>>,
}

impl Default for ValidationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationOrchestrator {
    /// Create an orchestrator with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an orchestrator from a configuration.
    pub fn with_config(config: Config) -> Self {
        let validators: Vec<Arc<dyn ModelValidator>> = vec![
            Arc::new(StructuralValidator::new()),
            Arc::new(SolverCompatibilityValidator::with_limits(
                config.solver_limits.clone(),
            )),
        ];
        Self {
            consensus: ConsensusBuilder::with_thresholds(config.consensus.clone()),
            history: Arc::new(RwLock::new(ValidationHistory::new(
                config.orchestrator.history_capacity,
            ))),
            validators,
            config,
        }
    }

    /// Register an extra validator perspective, used by the premium tier.
    pub fn with_validator(mut self, validator: Arc<dyn ModelValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Validate a model-generation payload at the given tier.
    ///
    /// Never fails: an internal fault comes back as `status=uncertain` with
    /// all scores 0.0 rather than as an error.
    pub async fn validate(&self, payload: &Value, tier: ValidationTier) -> ValidationResult {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let result = match self.run(payload, tier, request_id).await {
            Ok(result) => result,
            Err(fault) => {
                error!(%request_id, tier = tier.as_str(), error = %fault, "validation degraded to uncertain");
                self.fallback_result(tier, request_id, &fault)
            }
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.history
            .write()
            .await
            .record(HistoryEntry::summarize(&result, elapsed_ms));

        info!(
            %request_id,
            tier = tier.as_str(),
            status = result.status.as_str(),
            consensus_score = result.consensus_score,
            issues = result.issues.len(),
            elapsed_ms,
            "validation complete"
        );

        result
    }

    /// Aggregate statistics over the rolling history.
    ///
    /// Returns the `insufficient_data` sentinel below 5 recorded entries.
    pub async fn get_statistics(&self) -> ValidationStatistics {
        self.history.read().await.statistics()
    }

    /// Number of validations currently retained in the history.
    pub async fn history_len(&self) -> usize {
        self.history.read().await.len()
    }

    /// Drop all retained history entries.
    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }

    /// Steps 1-4: extract, run validators concurrently, build consensus.
    async fn run(
        &self,
        payload: &Value,
        tier: ValidationTier,
        request_id: Uuid,
    ) -> CoreResult<ValidationResult> {
        let model = Arc::new(extract_structure(payload));
        let selected = self.validators_for(tier);
        let reports = self.run_validators(&selected, &model).await;

        let outcome = match tier {
            ValidationTier::Basic => self.consensus.build_basic(&reports),
            ValidationTier::Standard | ValidationTier::Premium => {
                self.consensus.build_weighted(&reports)
            }
        };

        Ok(self.assemble(tier, request_id, reports, outcome))
    }

    /// Validator set for a tier: the two built-ins for basic/standard, the
    /// full registered set for premium.
    fn validators_for(&self, tier: ValidationTier) -> Vec<Arc<dyn ModelValidator>> {
        match tier {
            ValidationTier::Basic | ValidationTier::Standard => self
                .validators
                .iter()
                .take(BUILTIN_VALIDATORS)
                .cloned()
                .collect(),
            ValidationTier::Premium => self.validators.clone(),
        }
    }

    /// Run validators as independent tasks and join them under the
    /// per-request timeout. A task that errors, panics, or times out is
    /// converted into a degraded 0.0-score report instead of aborting the
    /// request.
    async fn run_validators(
        &self,
        selected: &[Arc<dyn ModelValidator>],
        model: &Arc<ModelStructure>,
    ) -> Vec<ValidatorReport> {
        let timeout = self.config.orchestrator.validator_timeout();

        let handles: Vec<_> = selected
            .iter()
            .map(|validator| {
                let validator = Arc::clone(validator);
                let model = Arc::clone(model);
                let name = validator.name().to_string();
                let kind = validator.kind();
                let handle = tokio::spawn(async move {
                    let started = Instant::now();
                    let verdict = validator.evaluate(&model).await;
                    (verdict, started.elapsed())
                });
                (name, kind, handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (name, kind, mut handle) in handles {
            let report = match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok((Ok(verdict), elapsed))) => ValidatorReport {
                    name,
                    kind,
                    score: verdict.score,
                    issues: verdict.issues,
                    recommendations: verdict.recommendations,
                    elapsed_ms: elapsed.as_secs_f64() * 1000.0,
                    degraded: false,
                },
                Ok(Ok((Err(fault), elapsed))) => {
                    warn!(validator = %name, error = %fault, "validator fault, degrading to 0.0");
                    degraded_report(name, kind, elapsed.as_secs_f64() * 1000.0, &fault)
                }
                Ok(Err(join_error)) => {
                    let fault = CoreError::ValidatorFault {
                        validator: name.clone(),
                        message: join_error.to_string(),
                    };
                    warn!(validator = %name, error = %fault, "validator task panicked, degrading to 0.0");
                    degraded_report(name, kind, 0.0, &fault)
                }
                Err(_) => {
                    handle.abort();
                    let fault = CoreError::ValidatorTimeout {
                        validator: name.clone(),
                    };
                    warn!(validator = %name, "validator timed out, degrading to 0.0");
                    degraded_report(name, kind, timeout.as_secs_f64() * 1000.0, &fault)
                }
            };
            reports.push(report);
        }
        reports
    }

    /// Build the final result from the consensus outcome.
    fn assemble(
        &self,
        tier: ValidationTier,
        request_id: Uuid,
        reports: Vec<ValidatorReport>,
        outcome: ConsensusOutcome,
    ) -> ValidationResult {
        let structural_score = kind_score(&reports, ValidatorKind::Structural);
        let solver_score = kind_score(&reports, ValidatorKind::Solver);

        ValidationResult {
            status: outcome.status,
            consensus_score: outcome.consensus_score,
            structural_score,
            solver_score,
            issues: outcome.issues.into_iter().map(|i| i.message).collect(),
            recommendations: outcome
                .recommendations
                .into_iter()
                .map(|r| r.message)
                .collect(),
            confidence: outcome.consensus_score,
            tier,
            timestamp: Utc::now(),
            details: ValidationDetails {
                request_id,
                tier,
                agreement_level: outcome.agreement_level,
                validators: reports,
            },
        }
    }

    /// Step 6: the whole-result uncertain fallback for an
    /// OrchestrationFault.
    fn fallback_result(
        &self,
        tier: ValidationTier,
        request_id: Uuid,
        fault: &CoreError,
    ) -> ValidationResult {
        ValidationResult {
            status: ValidationStatus::Uncertain,
            consensus_score: 0.0,
            structural_score: 0.0,
            solver_score: 0.0,
            issues: vec![format!("validation engine failure: {fault}")],
            recommendations: vec![
                Recommendation::required("retry the validation with the basic tier").message,
            ],
            confidence: 0.0,
            tier,
            timestamp: Utc::now(),
            details: ValidationDetails {
                request_id,
                tier,
                agreement_level: None,
                validators: Vec::new(),
            },
        }
    }
}

/// Mean score of a validator kind, 0.0 when the kind produced no report.
fn kind_score(reports: &[ValidatorReport], kind: ValidatorKind) -> f64 {
    let scores: Vec<f64> = reports
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| r.score)
        .collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// A 0.0-score report carrying one explanatory issue.
fn degraded_report(
    name: String,
    kind: ValidatorKind,
    elapsed_ms: f64,
    fault: &CoreError,
) -> ValidatorReport {
    ValidatorReport {
        issues: vec![Issue::critical(fault.to_string())],
        recommendations: Vec::new(),
        name,
        kind,
        score: 0.0,
        elapsed_ms,
        degraded: true,
    }
}

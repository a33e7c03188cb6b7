//! End-to-end scenarios for the consensus validation engine.
//!
//! Exercises the public orchestrator surface the way a calling pipeline
//! would: raw JSON payloads in, `ValidationResult` out, statistics on the
//! side.

use serde_json::{json, Value};
use std::sync::Arc;

use optval_core::orchestrator::ValidationOrchestrator;
use optval_core::types::{ModelStructure, ValidationStatus, ValidationTier, ValidatorKind};
use optval_core::validators::{ModelValidator, ValidatorVerdict};
use optval_core::{CoreError, CoreResult};

/// A well-formed model: 3 bounded continuous variables, 2 consistent
/// constraints, a valid minimize objective.
fn clean_payload() -> Value {
    json!({
        "variables": [
            {"name": "x", "type": "continuous", "bounds": [0, 10]},
            {"name": "y", "type": "continuous", "bounds": [0, 20]},
            {"name": "z", "type": "continuous", "bounds": [0, 30]},
        ],
        "constraints": [
            {"name": "capacity", "variables": ["x", "y"], "coefficients": [1.0, 2.0],
             "rhs": 15.0, "sense": "<="},
            {"name": "demand", "variables": ["y", "z"], "coefficients": [1.0, 1.0],
             "rhs": 25.0, "sense": ">="},
        ],
        "objective": {"type": "minimize", "variables": ["x", "y", "z"],
                      "coefficients": [1.0, 1.0, 1.0]},
        "metadata": {"tier": "standard", "expected_quality": 0.9, "total_cost": 0.01},
    })
}

// =========================================================================
// Scenario A: clean model is valid with perfect scores
// =========================================================================

#[tokio::test(flavor = "multi_thread")]
async fn clean_model_is_valid_with_perfect_consensus() {
    let orchestrator = ValidationOrchestrator::new();
    let result = orchestrator
        .validate(&clean_payload(), ValidationTier::Standard)
        .await;

    assert_eq!(result.status, ValidationStatus::Valid);
    assert_eq!(result.structural_score, 1.0);
    assert_eq!(result.solver_score, 1.0);
    assert_eq!(result.consensus_score, 1.0);
    assert_eq!(result.confidence, 1.0);
    assert!(result.issues.is_empty());
    assert!(result.recommendations.is_empty());
    assert_eq!(result.details.agreement_level, Some(1.0));
}

// =========================================================================
// Scenario B: undefined reference fails fast and invalidates
// =========================================================================

#[tokio::test(flavor = "multi_thread")]
async fn undefined_reference_fails_fast_to_invalid() {
    let mut payload = clean_payload();
    payload["constraints"][0]["variables"] = json!(["x", "phantom"]);
    payload["constraints"][0]["coefficients"] = json!([1.0, 1.0]);

    let orchestrator = ValidationOrchestrator::new();
    let result = orchestrator
        .validate(&payload, ValidationTier::Standard)
        .await;

    assert_eq!(result.status, ValidationStatus::Invalid);
    assert!(result.structural_score <= 0.1 + 1e-12);
    assert!(result
        .issues
        .iter()
        .any(|i| i.contains("undefined variable 'phantom'")));
    // Fail-fast: the structural report carries only the critical-stage
    // issues, nothing from the later stages.
    let structural = &result.details.validators[0];
    assert!(structural
        .issues
        .iter()
        .all(|i| i.message.contains("phantom") || i.message.contains("placeholder")));
}

// =========================================================================
// Scenario C: oversized model penalized with decomposition advice
// =========================================================================

#[tokio::test(flavor = "multi_thread")]
async fn oversized_model_recommends_decomposition() {
    let variables: Vec<Value> = (0..15_000)
        .map(|i| json!({"name": format!("x{i}"), "type": "continuous", "bounds": [0, 1]}))
        .collect();
    let payload = json!({
        "variables": variables,
        "constraints": [
            {"name": "c1", "variables": ["x0"], "coefficients": [1.0], "rhs": 1.0, "sense": "<="},
            {"name": "c2", "variables": ["x1"], "coefficients": [1.0], "rhs": 1.0, "sense": "<="},
        ],
        "objective": {"type": "minimize", "variables": ["x0"], "coefficients": [1.0]},
    });

    let orchestrator = ValidationOrchestrator::new();
    let result = orchestrator
        .validate(&payload, ValidationTier::Standard)
        .await;

    assert_eq!(result.structural_score, 1.0);
    assert!((result.solver_score - 0.8).abs() < 1e-12);
    let solver = result
        .details
        .validators
        .iter()
        .find(|r| r.kind == ValidatorKind::Solver)
        .unwrap();
    assert!(solver
        .recommendations
        .iter()
        .any(|r| r.message.contains("decomposition")));
}

// =========================================================================
// Scenario D: statistics sentinel below five validations
// =========================================================================

#[tokio::test(flavor = "multi_thread")]
async fn statistics_sentinel_below_five_entries() {
    let orchestrator = ValidationOrchestrator::new();
    for _ in 0..4 {
        orchestrator
            .validate(&clean_payload(), ValidationTier::Standard)
            .await;
    }

    let stats = serde_json::to_value(orchestrator.get_statistics().await).unwrap();
    assert_eq!(stats, json!({"status": "insufficient_data"}));

    orchestrator
        .validate(&clean_payload(), ValidationTier::Basic)
        .await;
    let stats = serde_json::to_value(orchestrator.get_statistics().await).unwrap();
    assert_eq!(stats["total_validations"], json!(5));
    assert_eq!(stats["status_distribution"]["valid"], json!(1.0));
    assert!((stats["tier_distribution"]["basic"].as_f64().unwrap() - 0.2).abs() < 1e-12);
    assert!(stats["average_execution_time"].as_f64().unwrap() >= 0.0);
}

// =========================================================================
// Scenario E: injected validator fault degrades, never valid
// =========================================================================

struct InjectedFault;

#[async_trait::async_trait]
impl ModelValidator for InjectedFault {
    fn name(&self) -> &str {
        "injected_fault"
    }

    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Structural
    }

    async fn evaluate(&self, _model: &ModelStructure) -> CoreResult<ValidatorVerdict> {
        Err(CoreError::ValidatorFault {
            validator: "injected_fault".to_string(),
            message: "simulated internal failure".to_string(),
        })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn injected_fault_is_visible_and_blocks_valid() {
    let orchestrator = ValidationOrchestrator::new().with_validator(Arc::new(InjectedFault));
    let result = orchestrator
        .validate(&clean_payload(), ValidationTier::Premium)
        .await;

    assert_ne!(result.status, ValidationStatus::Valid);
    let injected = result
        .details
        .validators
        .iter()
        .find(|r| r.name == "injected_fault")
        .expect("degraded contribution retained in details");
    assert_eq!(injected.score, 0.0);
    assert!(injected.degraded);
    assert!(injected.issues[0].message.contains("simulated internal failure"));
}

// =========================================================================
// Properties
// =========================================================================

#[tokio::test(flavor = "multi_thread")]
async fn scores_always_in_unit_interval() {
    let payloads = [
        json!({}),
        json!({"variables": [{"name": "x", "type": "mystery"}]}),
        json!({"constraints": [{"name": "c", "variables": ["a", "b", "c"],
                "coefficients": [], "rhs": "placeholder"}]}),
        clean_payload(),
    ];

    let orchestrator = ValidationOrchestrator::new();
    for payload in &payloads {
        for tier in [
            ValidationTier::Basic,
            ValidationTier::Standard,
            ValidationTier::Premium,
        ] {
            let result = orchestrator.validate(payload, tier).await;
            for score in [
                result.consensus_score,
                result.structural_score,
                result.solver_score,
                result.confidence,
            ] {
                assert!((0.0..=1.0).contains(&score), "score {score} out of range");
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn validation_is_idempotent() {
    let mut payload = clean_payload();
    payload["constraints"][1]["coefficients"] = json!([1.0]); // count mismatch
    payload["variables"][0]["type"] = json!("mystery");

    let orchestrator = ValidationOrchestrator::new();
    let first = orchestrator
        .validate(&payload, ValidationTier::Standard)
        .await;
    let second = orchestrator
        .validate(&payload, ValidationTier::Standard)
        .await;

    assert_eq!(first.status, second.status);
    assert_eq!(first.consensus_score.to_bits(), second.consensus_score.to_bits());
    assert_eq!(first.issues, second.issues);
    assert_eq!(first.recommendations, second.recommendations);
}

#[tokio::test(flavor = "multi_thread")]
async fn tier_effort_is_monotonic() {
    let orchestrator = ValidationOrchestrator::new().with_validator(Arc::new(InjectedFault));
    let payload = clean_payload();

    let basic = orchestrator.validate(&payload, ValidationTier::Basic).await;
    let standard = orchestrator
        .validate(&payload, ValidationTier::Standard)
        .await;
    let premium = orchestrator
        .validate(&payload, ValidationTier::Premium)
        .await;

    assert!(basic.details.validators.len() <= standard.details.validators.len());
    assert!(standard.details.validators.len() <= premium.details.validators.len());
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_variables_always_caps_structural_score() {
    let payload = json!({
        "constraints": [
            {"name": "c1", "variables": [], "coefficients": [], "rhs": 1.0, "sense": "<="},
            {"name": "c2", "variables": [], "coefficients": [], "rhs": 2.0, "sense": "<="},
        ],
        "objective": {"type": "minimize", "variables": [], "coefficients": []},
    });

    let orchestrator = ValidationOrchestrator::new();
    let result = orchestrator
        .validate(&payload, ValidationTier::Standard)
        .await;
    assert!(result.structural_score <= 0.3);
}

#[tokio::test(flavor = "multi_thread")]
async fn wire_output_carries_exact_field_names() {
    let orchestrator = ValidationOrchestrator::new();
    let result = orchestrator
        .validate(&clean_payload(), ValidationTier::Standard)
        .await;
    let wire = serde_json::to_value(&result).unwrap();

    let object = wire.as_object().unwrap();
    let expected = [
        "status",
        "consensus_score",
        "structural_score",
        "solver_score",
        "issues",
        "recommendations",
        "confidence",
        "tier",
        "timestamp",
        "details",
    ];
    assert_eq!(object.len(), expected.len());
    for field in expected {
        assert!(object.contains_key(field), "missing wire field: {field}");
    }
    assert_eq!(wire["status"], json!("valid"));
    assert_eq!(wire["tier"], json!("standard"));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_validations_share_one_history() {
    let orchestrator = Arc::new(ValidationOrchestrator::new());
    let mut handles = Vec::new();
    for i in 0..8 {
        let orchestrator = Arc::clone(&orchestrator);
        handles.push(tokio::spawn(async move {
            let tier = if i % 2 == 0 {
                ValidationTier::Basic
            } else {
                ValidationTier::Standard
            };
            orchestrator.validate(&clean_payload(), tier).await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(orchestrator.history_len().await, 8);
}

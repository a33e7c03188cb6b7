//! Consensus builder: merge validator outputs into one verdict.
//!
//! The standard tier blends the structural and solver-compatibility scores
//! 0.6/0.4 (structural correctness weighted higher: a solver-friendly but
//! semantically broken model is still rejected), computes the agreement
//! level between the two perspectives, deduplicates the merged issues, and
//! prioritizes them by the severity tags attached at creation time.
//!
//! The basic tier is a plain arithmetic mean with no agreement computation
//! and no prioritization. The premium tier generalizes the standard
//! algorithm to N >= 2 validators: structural-kind validators share the 0.6
//! aggregate weight, solver-kind the 0.4, and the minimum pairwise
//! agreement substitutes for the two-way agreement level.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{
    Issue, Recommendation, RecommendationKind, Severity, ValidationStatus, ValidatorKind,
    ValidatorReport,
};

// =========================================================================
// Configuration
// =========================================================================

/// Weights and thresholds for the consensus combination.
///
/// Must satisfy: weights sum to 1.0, `valid_threshold > improvement_threshold`,
/// everything in [0, 1]. Checked by [`ConsensusThresholds::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusThresholds {
    /// Aggregate weight of structural-kind validators (default 0.6).
    pub structural_weight: f64,
    /// Aggregate weight of solver-kind validators (default 0.4).
    pub solver_weight: f64,
    /// Consensus score at or above which a model can be `valid` (default 0.9).
    pub valid_threshold: f64,
    /// Agreement level additionally required for `valid` (default 0.8).
    pub agreement_threshold: f64,
    /// Consensus score at or above which a model is `needs_improvement`
    /// rather than `invalid` (default 0.7).
    pub improvement_threshold: f64,
}

impl Default for ConsensusThresholds {
    fn default() -> Self {
        Self {
            structural_weight: 0.6,
            solver_weight: 0.4,
            valid_threshold: 0.9,
            agreement_threshold: 0.8,
            improvement_threshold: 0.7,
        }
    }
}

impl ConsensusThresholds {
    /// Validate internal consistency.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        if (self.structural_weight + self.solver_weight - 1.0).abs() > 1e-9 {
            return Err(format!(
                "consensus weights must sum to 1.0, got {} + {}",
                self.structural_weight, self.solver_weight
            ));
        }
        if self.valid_threshold <= self.improvement_threshold {
            return Err(format!(
                "valid_threshold ({}) must exceed improvement_threshold ({})",
                self.valid_threshold, self.improvement_threshold
            ));
        }
        for (name, value) in [
            ("structural_weight", self.structural_weight),
            ("solver_weight", self.solver_weight),
            ("valid_threshold", self.valid_threshold),
            ("agreement_threshold", self.agreement_threshold),
            ("improvement_threshold", self.improvement_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must lie in [0, 1], got {value}"));
            }
        }
        Ok(())
    }
}

// =========================================================================
// Outcome
// =========================================================================

/// What the consensus builder decided.
#[derive(Debug, Clone)]
pub struct ConsensusOutcome {
    /// Final verdict.
    pub status: ValidationStatus,
    /// Blended (or, for basic, averaged) score.
    pub consensus_score: f64,
    /// Agreement level; `None` for the basic tier.
    pub agreement_level: Option<f64>,
    /// Merged, deduplicated, prioritized issues.
    pub issues: Vec<Issue>,
    /// Merged, deduplicated, prioritized recommendations.
    pub recommendations: Vec<Recommendation>,
}

// =========================================================================
// ConsensusBuilder
// =========================================================================

/// Combines validator reports into a single verdict.
#[derive(Debug, Clone, Default)]
pub struct ConsensusBuilder {
    thresholds: ConsensusThresholds,
}

impl ConsensusBuilder {
    /// Create a builder with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom thresholds.
    pub fn with_thresholds(thresholds: ConsensusThresholds) -> Self {
        Self { thresholds }
    }

    /// Basic tier: unweighted mean, no agreement, no prioritization.
    ///
    /// Issues and recommendations from all validators are merged in order
    /// with duplicates removed, nothing filtered.
    pub fn build_basic(&self, reports: &[ValidatorReport]) -> ConsensusOutcome {
        let mean = if reports.is_empty() {
            0.0
        } else {
            reports.iter().map(|r| r.score).sum::<f64>() / reports.len() as f64
        };

        let (issues, recommendations) = merge_outputs(reports);

        ConsensusOutcome {
            status: self.decide_status(mean, None),
            consensus_score: mean,
            agreement_level: None,
            issues,
            recommendations,
        }
    }

    /// Standard/premium tier: weighted blend, pairwise agreement,
    /// severity-driven prioritization.
    ///
    /// Structural-kind validators share the structural weight evenly,
    /// solver-kind the solver weight; with exactly one of each this is the
    /// plain 0.6/0.4 blend. Agreement is the minimum pairwise agreement
    /// (`1 - |a - b|`) across all validator pairs, which for two validators
    /// reduces to the two-way agreement level.
    pub fn build_weighted(&self, reports: &[ValidatorReport]) -> ConsensusOutcome {
        let consensus_score = self.weighted_score(reports);
        let agreement = min_pairwise_agreement(reports);

        let (issues, recommendations) = merge_outputs(reports);
        let (issues, recommendations) =
            self.prioritize(consensus_score, issues, recommendations);

        ConsensusOutcome {
            status: self.decide_status(consensus_score, Some(agreement)),
            consensus_score,
            agreement_level: Some(agreement),
            issues,
            recommendations,
        }
    }

    /// Blend scores by kind group: each group's aggregate weight is split
    /// evenly among its members. A missing group's weight is renormalized
    /// onto the present one so the result stays in [0, 1].
    fn weighted_score(&self, reports: &[ValidatorReport]) -> f64 {
        let structural: Vec<f64> = scores_of_kind(reports, ValidatorKind::Structural);
        let solver: Vec<f64> = scores_of_kind(reports, ValidatorKind::Solver);

        let mut score = 0.0;
        let mut weight_used = 0.0;
        if !structural.is_empty() {
            score += self.thresholds.structural_weight * mean(&structural);
            weight_used += self.thresholds.structural_weight;
        }
        if !solver.is_empty() {
            score += self.thresholds.solver_weight * mean(&solver);
            weight_used += self.thresholds.solver_weight;
        }

        if weight_used > 0.0 {
            score / weight_used
        } else {
            0.0
        }
    }

    /// Three-way status decision shared by all tiers.
    ///
    /// `valid` additionally requires agreement when an agreement level was
    /// computed; the basic tier passes `None` and decides on score alone.
    fn decide_status(&self, consensus: f64, agreement: Option<f64>) -> ValidationStatus {
        let agrees = agreement.is_none_or(|a| a >= self.thresholds.agreement_threshold);
        if consensus >= self.thresholds.valid_threshold && agrees {
            ValidationStatus::Valid
        } else if consensus >= self.thresholds.improvement_threshold {
            ValidationStatus::NeedsImprovement
        } else {
            ValidationStatus::Invalid
        }
    }

    /// Severity-driven prioritization, applied after the merge.
    ///
    /// - score >= valid threshold: only minor issues / advisory
    ///   recommendations are worth surfacing;
    /// - improvement band: the first 5 issues and first 3 recommendations
    ///   in original order;
    /// - below: every issue, but only required-fix recommendations.
    fn prioritize(
        &self,
        consensus: f64,
        issues: Vec<Issue>,
        recommendations: Vec<Recommendation>,
    ) -> (Vec<Issue>, Vec<Recommendation>) {
        if consensus >= self.thresholds.valid_threshold {
            (
                issues
                    .into_iter()
                    .filter(|i| i.severity == Severity::Minor)
                    .collect(),
                recommendations
                    .into_iter()
                    .filter(|r| r.kind == RecommendationKind::Advisory)
                    .collect(),
            )
        } else if consensus >= self.thresholds.improvement_threshold {
            (
                issues.into_iter().take(5).collect(),
                recommendations.into_iter().take(3).collect(),
            )
        } else {
            (
                issues,
                recommendations
                    .into_iter()
                    .filter(|r| r.kind == RecommendationKind::Required)
                    .collect(),
            )
        }
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn scores_of_kind(reports: &[ValidatorReport], kind: ValidatorKind) -> Vec<f64> {
    reports
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| r.score)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Minimum pairwise agreement across all validator pairs.
///
/// A single report agrees with itself perfectly.
fn min_pairwise_agreement(reports: &[ValidatorReport]) -> f64 {
    let mut min_agreement: f64 = 1.0;
    for (i, a) in reports.iter().enumerate() {
        for b in &reports[i + 1..] {
            min_agreement = min_agreement.min(1.0 - (a.score - b.score).abs());
        }
    }
    min_agreement.clamp(0.0, 1.0)
}

/// Union of all reports' issues and recommendations with set semantics:
/// duplicates removed, first-seen order preserved.
fn merge_outputs(reports: &[ValidatorReport]) -> (Vec<Issue>, Vec<Recommendation>) {
    let mut seen_issues = HashSet::new();
    let mut issues = Vec::new();
    let mut seen_recs = HashSet::new();
    let mut recommendations = Vec::new();

    for report in reports {
        for issue in &report.issues {
            if seen_issues.insert(issue.message.clone()) {
                issues.push(issue.clone());
            }
        }
        for rec in &report.recommendations {
            if seen_recs.insert(rec.message.clone()) {
                recommendations.push(rec.clone());
            }
        }
    }

    (issues, recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Fixtures
    // =====================================================================

    fn report(kind: ValidatorKind, score: f64) -> ValidatorReport {
        ValidatorReport {
            name: match kind {
                ValidatorKind::Structural => "structural".to_string(),
                ValidatorKind::Solver => "solver_compatibility".to_string(),
            },
            kind,
            score,
            issues: vec![],
            recommendations: vec![],
            elapsed_ms: 0.1,
            degraded: false,
        }
    }

    fn report_with(
        kind: ValidatorKind,
        score: f64,
        issues: Vec<Issue>,
        recommendations: Vec<Recommendation>,
    ) -> ValidatorReport {
        ValidatorReport {
            issues,
            recommendations,
            ..report(kind, score)
        }
    }

    // =====================================================================
    // Weighted blend and agreement
    // =====================================================================

    #[test]
    fn test_standard_blend_is_point_six_point_four() {
        let builder = ConsensusBuilder::new();
        let reports = [
            report(ValidatorKind::Structural, 1.0),
            report(ValidatorKind::Solver, 0.5),
        ];
        let outcome = builder.build_weighted(&reports);
        assert!((outcome.consensus_score - 0.8).abs() < 1e-12);
        assert!((outcome.agreement_level.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_scores_are_valid() {
        let builder = ConsensusBuilder::new();
        let reports = [
            report(ValidatorKind::Structural, 1.0),
            report(ValidatorKind::Solver, 1.0),
        ];
        let outcome = builder.build_weighted(&reports);
        assert_eq!(outcome.status, ValidationStatus::Valid);
        assert_eq!(outcome.consensus_score, 1.0);
    }

    #[test]
    fn test_disagreement_blocks_valid() {
        // High consensus but low agreement: 0.6*1.0 + 0.4*0.78 = 0.912,
        // agreement 0.78 < 0.8 so the model is only needs_improvement.
        let builder = ConsensusBuilder::new();
        let reports = [
            report(ValidatorKind::Structural, 1.0),
            report(ValidatorKind::Solver, 0.78),
        ];
        let outcome = builder.build_weighted(&reports);
        assert!(outcome.consensus_score >= 0.9);
        assert_eq!(outcome.status, ValidationStatus::NeedsImprovement);
    }

    #[test]
    fn test_low_consensus_is_invalid() {
        let builder = ConsensusBuilder::new();
        let reports = [
            report(ValidatorKind::Structural, 0.2),
            report(ValidatorKind::Solver, 0.9),
        ];
        let outcome = builder.build_weighted(&reports);
        assert!(outcome.consensus_score < 0.7);
        assert_eq!(outcome.status, ValidationStatus::Invalid);
    }

    #[test]
    fn test_n_way_weights_split_within_kind() {
        // Two structural validators at 1.0 and 0.5 share the 0.6 weight:
        // 0.6 * 0.75 + 0.4 * 1.0 = 0.85.
        let builder = ConsensusBuilder::new();
        let reports = [
            report(ValidatorKind::Structural, 1.0),
            report(ValidatorKind::Structural, 0.5),
            report(ValidatorKind::Solver, 1.0),
        ];
        let outcome = builder.build_weighted(&reports);
        assert!((outcome.consensus_score - 0.85).abs() < 1e-12);
        // Minimum pairwise agreement: 1 - |1.0 - 0.5| = 0.5.
        assert!((outcome.agreement_level.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_kind_renormalizes() {
        let builder = ConsensusBuilder::new();
        let reports = [report(ValidatorKind::Structural, 0.8)];
        let outcome = builder.build_weighted(&reports);
        assert!((outcome.consensus_score - 0.8).abs() < 1e-12);
    }

    // =====================================================================
    // Basic tier
    // =====================================================================

    #[test]
    fn test_basic_is_unweighted_mean_without_agreement() {
        let builder = ConsensusBuilder::new();
        let reports = [
            report(ValidatorKind::Structural, 1.0),
            report(ValidatorKind::Solver, 0.5),
        ];
        let outcome = builder.build_basic(&reports);
        assert!((outcome.consensus_score - 0.75).abs() < 1e-12);
        assert_eq!(outcome.agreement_level, None);
        assert_eq!(outcome.status, ValidationStatus::NeedsImprovement);
    }

    #[test]
    fn test_basic_keeps_everything_unfiltered() {
        let builder = ConsensusBuilder::new();
        let reports = [
            report_with(
                ValidatorKind::Structural,
                0.2,
                vec![Issue::critical("broken"), Issue::minor("untidy")],
                vec![Recommendation::advisory("consider tidying")],
            ),
            report_with(
                ValidatorKind::Solver,
                0.2,
                vec![Issue::major("slow")],
                vec![Recommendation::required("fix the break")],
            ),
        ];
        let outcome = builder.build_basic(&reports);
        assert_eq!(outcome.issues.len(), 3);
        assert_eq!(outcome.recommendations.len(), 2);
    }

    // =====================================================================
    // Merge and prioritization
    // =====================================================================

    #[test]
    fn test_merge_deduplicates_preserving_order() {
        let shared = Issue::critical("same defect");
        let builder = ConsensusBuilder::new();
        let reports = [
            report_with(ValidatorKind::Structural, 0.3, vec![shared.clone()], vec![]),
            report_with(
                ValidatorKind::Solver,
                0.3,
                vec![shared, Issue::major("other defect")],
                vec![],
            ),
        ];
        let outcome = builder.build_weighted(&reports);
        assert_eq!(outcome.issues.len(), 2);
        assert_eq!(outcome.issues[0].message, "same defect");
    }

    #[test]
    fn test_high_consensus_keeps_only_minor() {
        let builder = ConsensusBuilder::new();
        let reports = [
            report_with(
                ValidatorKind::Structural,
                1.0,
                vec![Issue::minor("slightly untidy")],
                vec![Recommendation::advisory("consider optimizing names")],
            ),
            report_with(
                ValidatorKind::Solver,
                0.95,
                vec![Issue::major("should not surface")],
                vec![Recommendation::required("should not surface either")],
            ),
        ];
        let outcome = builder.build_weighted(&reports);
        assert!(outcome.consensus_score >= 0.9);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].severity, Severity::Minor);
        assert_eq!(outcome.recommendations.len(), 1);
        assert_eq!(
            outcome.recommendations[0].kind,
            RecommendationKind::Advisory
        );
    }

    #[test]
    fn test_middle_band_truncates_five_and_three() {
        let issues: Vec<Issue> = (0..8).map(|i| Issue::major(format!("issue {i}"))).collect();
        let recs: Vec<Recommendation> = (0..6)
            .map(|i| Recommendation::required(format!("fix {i}")))
            .collect();
        let builder = ConsensusBuilder::new();
        let reports = [
            report_with(ValidatorKind::Structural, 0.8, issues, recs),
            report(ValidatorKind::Solver, 0.8),
        ];
        let outcome = builder.build_weighted(&reports);
        assert!(outcome.consensus_score >= 0.7 && outcome.consensus_score < 0.9);
        assert_eq!(outcome.issues.len(), 5);
        assert_eq!(outcome.issues[0].message, "issue 0");
        assert_eq!(outcome.recommendations.len(), 3);
    }

    #[test]
    fn test_low_band_keeps_all_issues_required_recs_only() {
        let builder = ConsensusBuilder::new();
        let reports = [
            report_with(
                ValidatorKind::Structural,
                0.1,
                (0..7).map(|i| Issue::critical(format!("defect {i}"))).collect(),
                vec![
                    Recommendation::required("fix the references"),
                    Recommendation::advisory("consider renaming"),
                ],
            ),
            report(ValidatorKind::Solver, 0.9),
        ];
        let outcome = builder.build_weighted(&reports);
        assert!(outcome.consensus_score < 0.7);
        assert_eq!(outcome.issues.len(), 7);
        assert_eq!(outcome.recommendations.len(), 1);
        assert_eq!(
            outcome.recommendations[0].kind,
            RecommendationKind::Required
        );
    }

    // =====================================================================
    // Threshold validation
    // =====================================================================

    #[test]
    fn test_default_thresholds_validate() {
        assert!(ConsensusThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_bad_weight_sum_rejected() {
        let thresholds = ConsensusThresholds {
            structural_weight: 0.7,
            solver_weight: 0.4,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let thresholds = ConsensusThresholds {
            valid_threshold: 0.6,
            improvement_threshold: 0.7,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());
    }
}

//! Domain types for the consensus validation engine.
//!
//! Split into the validation *subject* ([`ModelStructure`] and its parts)
//! and the validation *verdict* ([`ValidationResult`] and its parts).

mod model;
mod result;

pub use model::{
    Constraint, ModelMetadata, ModelStructure, Objective, Variable, KNOWN_OBJECTIVE_TYPES,
    KNOWN_VARIABLE_TYPES,
};
pub use result::{
    Issue, Recommendation, RecommendationKind, Severity, ValidationDetails, ValidationResult,
    ValidationStatus, ValidationTier, ValidatorKind, ValidatorReport,
};

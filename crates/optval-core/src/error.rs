//! Error types for optval-core.
//!
//! This module defines the central error type [`CoreError`] used throughout
//! the crate, along with the [`CoreResult<T>`] type alias.
//!
//! Malformed upstream payloads are deliberately NOT represented here:
//! extraction is a total function that defaults missing fields, so there is
//! no `ExtractionDefect` variant. Failures that do exist are either scoped
//! to a single validator (degrading its contribution to the consensus) or to
//! the orchestration around the validators (degrading the whole result to
//! `uncertain`). Nothing propagates past the orchestrator's public boundary.

use thiserror::Error;

/// Top-level error type for optval-core operations.
///
/// # Examples
///
/// ```rust
/// use optval_core::CoreError;
///
/// let err = CoreError::ValidatorFault {
///     validator: "structural".to_string(),
///     message: "index out of range".to_string(),
/// };
/// assert!(err.to_string().contains("structural"));
/// ```
#[derive(Debug, Error)]
pub enum CoreError {
    /// An unexpected internal failure inside a single validator's scoring
    /// routine. Caught at the validator boundary and converted into a 0.0
    /// score for that validator plus one explanatory issue.
    #[error("Validator '{validator}' failed: {message}")]
    ValidatorFault {
        /// Name of the validator that failed
        validator: String,
        /// Description of the failure
        message: String,
    },

    /// A validator did not complete within the per-request timeout.
    ///
    /// Treated like a failed validator rather than hanging the whole
    /// `validate()` call. Guards against pathological inputs making the
    /// reference-checking work run unexpectedly long.
    #[error("Validator '{validator}' did not complete within the allotted time")]
    ValidatorTimeout {
        /// Name of the validator that timed out
        validator: String,
    },

    /// A failure outside any single validator (extraction, consensus
    /// combination, task scheduling). Converted at the top level into a
    /// whole-result `status=uncertain` with confidence 0.0.
    #[error("Orchestration fault: {0}")]
    OrchestrationFault(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::ConfigError(err.to_string())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_fault_display() {
        let err = CoreError::ValidatorFault {
            validator: "solver_compatibility".to_string(),
            message: "panicked".to_string(),
        };
        assert!(err.to_string().contains("solver_compatibility"));
        assert!(err.to_string().contains("panicked"));
    }

    #[test]
    fn test_timeout_display_names_validator() {
        let err = CoreError::ValidatorTimeout {
            validator: "structural".to_string(),
        };
        assert!(err.to_string().contains("allotted time"));
    }

    #[test]
    fn test_serde_json_error_converts() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json");
        let err: CoreError = bad.unwrap_err().into();
        assert!(matches!(err, CoreError::SerializationError(_)));
    }
}

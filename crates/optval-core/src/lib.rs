//! Consensus validation engine for machine-generated optimization models.
//!
//! Validates a candidate model (variables, constraints, objective) before
//! it is handed to a numeric solver and returns a single actionable verdict
//! combining independent scoring perspectives.
//!
//! # Architecture
//!
//! - [`extract`]: permissive projection of an arbitrary upstream payload
//!   into a canonical [`types::ModelStructure`] — cannot fail.
//! - [`validators`]: the [`validators::ModelValidator`] trait plus the two
//!   built-in perspectives (structural correctness, solver compatibility).
//! - [`consensus`]: weighted multi-perspective combination with tiered
//!   depth (basic mean / standard two-way / premium N-way).
//! - [`orchestrator`]: the `validate()` entry point; runs validators as
//!   concurrent tasks, never raises past its boundary, and keeps a bounded
//!   rolling history for aggregate statistics.
//!
//! # Example
//!
//! ```rust
//! use optval_core::orchestrator::ValidationOrchestrator;
//! use optval_core::types::{ValidationStatus, ValidationTier};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let orchestrator = ValidationOrchestrator::new();
//! let payload = json!({
//!     "variables": [{"name": "x", "type": "continuous", "bounds": [0, 10]}],
//!     "constraints": [
//!         {"name": "c1", "variables": ["x"], "coefficients": [1.0], "rhs": 5.0, "sense": "<="},
//!         {"name": "c2", "variables": ["x"], "coefficients": [2.0], "rhs": 8.0, "sense": "<="},
//!     ],
//!     "objective": {"type": "minimize", "variables": ["x"], "coefficients": [1.0]},
//! });
//!
//! let result = orchestrator.validate(&payload, ValidationTier::Standard).await;
//! assert_eq!(result.status, ValidationStatus::Valid);
//! # }
//! ```

pub mod config;
pub mod consensus;
pub mod error;
pub mod extract;
pub mod history;
pub mod orchestrator;
pub mod types;
pub mod validators;

// Re-exports for convenience
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use orchestrator::ValidationOrchestrator;
pub use types::{ValidationResult, ValidationStatus, ValidationTier};

//! Configuration management for the validation engine.
//!
//! Layered the same way across environments: `config/default.toml`, then
//! `config/{OPTVAL_ENV}.toml`, then `OPTVAL__`-prefixed environment
//! variables. Every tunable ships with the engine's documented default, so
//! an empty configuration is fully functional.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::consensus::ConsensusThresholds;
use crate::error::{CoreError, CoreResult};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::validators::SolverLimits;

/// Orchestrator-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Rolling history capacity (entries retained for statistics).
    pub history_capacity: usize,
    /// Per-validator timeout in milliseconds. A validator that does not
    /// complete in time contributes a 0.0 score instead of hanging the call.
    pub validator_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            validator_timeout_ms: 5_000,
        }
    }
}

impl OrchestratorConfig {
    /// Per-validator timeout as a [`Duration`].
    pub fn validator_timeout(&self) -> Duration {
        Duration::from_millis(self.validator_timeout_ms)
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Consensus weights and status thresholds.
    #[serde(default)]
    pub consensus: ConsensusThresholds,
    /// Solver-compatibility numeric limits.
    #[serde(default)]
    pub solver_limits: SolverLimits,
    /// Orchestrator settings.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Sources, in order:
    /// 1. `config/default.toml` (base settings)
    /// 2. `config/{OPTVAL_ENV}.toml` (environment-specific)
    /// 3. Environment variables with `OPTVAL` prefix (`__` separator)
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigError`] when a source is malformed or the
    /// merged values are inconsistent.
    pub fn load() -> CoreResult<Self> {
        let env = std::env::var("OPTVAL_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("OPTVAL").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigError`] when the file cannot be read,
    /// parsed, or validated.
    pub fn from_file(path: &std::path::Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CoreError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigError`] on the first inconsistency.
    pub fn validate(&self) -> CoreResult<()> {
        self.consensus.validate().map_err(CoreError::ConfigError)?;

        if self.orchestrator.history_capacity == 0 {
            return Err(CoreError::ConfigError(
                "orchestrator.history_capacity must be greater than 0".into(),
            ));
        }
        if self.orchestrator.validator_timeout_ms == 0 {
            return Err(CoreError::ConfigError(
                "orchestrator.validator_timeout_ms must be greater than 0".into(),
            ));
        }

        let limits = &self.solver_limits;
        if limits.max_coefficient_magnitude <= 0.0 {
            return Err(CoreError::ConfigError(
                "solver_limits.max_coefficient_magnitude must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&limits.max_unbounded_fraction) {
            return Err(CoreError::ConfigError(
                "solver_limits.max_unbounded_fraction must lie in [0, 1]".into(),
            ));
        }
        if limits.max_variables == 0 || limits.max_constraints == 0 {
            return Err(CoreError::ConfigError(
                "solver_limits problem-size limits must be greater than 0".into(),
            ));
        }
        if limits.max_constraint_ratio <= 0.0 {
            return Err(CoreError::ConfigError(
                "solver_limits.max_constraint_ratio must be positive".into(),
            ));
        }

        Ok(())
    }
}

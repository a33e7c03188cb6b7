//! Canonical model structure types.
//!
//! [`ModelStructure`] is the canonical, defaulted representation of a
//! candidate optimization model. It is deliberately loose where the
//! validators must be able to see malformed input: variable types and
//! constraint senses stay raw strings, and bounds / coefficients / rhs stay
//! `serde_json::Value` so that a generated model with a string where a
//! number belongs still extracts cleanly and gets *scored*, not rejected at
//! the boundary.
//!
//! Once extracted a `ModelStructure` is never mutated; validators only read.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Variable types a numeric solver understands.
pub const KNOWN_VARIABLE_TYPES: [&str; 3] = ["continuous", "integer", "binary"];

/// Objective senses a numeric solver understands.
pub const KNOWN_OBJECTIVE_TYPES: [&str; 2] = ["minimize", "maximize"];

/// A single decision variable as authored by the model-generation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name; must be unique across the model (checked by
    /// validators, not by the type system).
    pub name: String,
    /// Raw declared type. Expected to be one of [`KNOWN_VARIABLE_TYPES`].
    #[serde(rename = "type")]
    pub var_type: String,
    /// Raw bounds. Well-formed bounds are a `[lower, upper]` two-element
    /// numeric array; anything else is preserved for the validators to flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Value>,
}

impl Variable {
    /// Whether the declared type is one a solver understands.
    pub fn has_known_type(&self) -> bool {
        KNOWN_VARIABLE_TYPES.contains(&self.var_type.as_str())
    }

    /// Whether bounds are a well-formed `[lower, upper]` numeric pair.
    ///
    /// Absent bounds are well-formed (the variable is simply unbounded).
    pub fn has_well_formed_bounds(&self) -> bool {
        match &self.bounds {
            None => true,
            Some(Value::Array(pair)) => pair.len() == 2 && pair.iter().all(Value::is_number),
            Some(_) => false,
        }
    }

    /// Whether the variable is effectively unbounded on both sides.
    ///
    /// True when bounds are absent, malformed, or span the full real line
    /// (either endpoint missing or non-finite).
    pub fn is_unbounded(&self) -> bool {
        match &self.bounds {
            None => true,
            Some(Value::Array(pair)) if pair.len() == 2 => !pair
                .iter()
                .all(|v| v.as_f64().is_some_and(f64::is_finite)),
            Some(_) => true,
        }
    }
}

/// A single linear constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint name (informational).
    pub name: String,
    /// Names of the variables this constraint references.
    #[serde(default)]
    pub variables: Vec<String>,
    /// Coefficients, positionally matched to `variables`. Kept raw so
    /// non-numeric entries survive extraction and get flagged.
    #[serde(default)]
    pub coefficients: Vec<Value>,
    /// Right-hand side. Well-formed when numeric; generated models
    /// sometimes leave placeholder text here.
    #[serde(default)]
    pub rhs: Value,
    /// Comparison sense: `<=`, `>=`, or `==`.
    #[serde(default)]
    pub sense: String,
}

impl Constraint {
    /// Variable references not present in `declared`.
    pub fn undefined_references<'a>(&'a self, declared: &HashSet<&str>) -> Vec<&'a str> {
        self.variables
            .iter()
            .map(String::as_str)
            .filter(|name| !declared.contains(name))
            .collect()
    }
}

/// The objective function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Whether the upstream payload carried an objective at all. An absent
    /// objective extracts to an empty record with this flag false, so the
    /// validators can tell "missing" apart from "empty".
    #[serde(default)]
    pub present: bool,
    /// Raw objective sense. Expected to be one of [`KNOWN_OBJECTIVE_TYPES`].
    #[serde(rename = "type", default)]
    pub obj_type: String,
    /// Names of the variables the objective references.
    #[serde(default)]
    pub variables: Vec<String>,
    /// Coefficients, positionally matched to `variables`.
    #[serde(default)]
    pub coefficients: Vec<Value>,
}

impl Objective {
    /// An empty, absent objective.
    pub fn absent() -> Self {
        Self {
            present: false,
            obj_type: String::new(),
            variables: Vec::new(),
            coefficients: Vec::new(),
        }
    }

    /// Whether the declared sense is one a solver understands.
    pub fn has_known_type(&self) -> bool {
        KNOWN_OBJECTIVE_TYPES.contains(&self.obj_type.as_str())
    }
}

/// Informational metadata from the model-generation stage.
///
/// Never drives scoring; retained for audit only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    /// Generation tier label reported upstream.
    #[serde(default)]
    pub tier: String,
    /// Quality the generation stage expected of itself.
    #[serde(default)]
    pub expected_quality: f64,
    /// Generation cost reported upstream.
    #[serde(default)]
    pub total_cost: f64,
}

/// Canonical, defaulted representation of a candidate optimization model.
///
/// Produced by [`crate::extract::extract_structure`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelStructure {
    /// Decision variables, in declaration order.
    #[serde(default)]
    pub variables: Vec<Variable>,
    /// Constraints, in declaration order.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// The objective function (possibly absent, see [`Objective::present`]).
    #[serde(default = "Objective::absent")]
    pub objective: Objective,
    /// Informational metadata; never drives scoring.
    #[serde(default)]
    pub metadata: ModelMetadata,
}

impl Default for Objective {
    fn default() -> Self {
        Self::absent()
    }
}

impl ModelStructure {
    /// Set of declared variable names, for reference checking.
    pub fn declared_names(&self) -> HashSet<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }
}

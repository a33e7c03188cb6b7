//! Model Structure Extractor.
//!
//! Normalizes an arbitrary upstream "model result" payload into a canonical
//! [`ModelStructure`]. This is the permissive boundary between whatever the
//! model-generation stage produced and the strict validators that follow:
//! missing nested fields default to empty sequences / empty records, scalar
//! names are coerced to strings, and nothing here can fail. The input is
//! never mutated.

use serde_json::Value;

use crate::types::{Constraint, ModelMetadata, ModelStructure, Objective, Variable};

/// Project an arbitrary payload into a canonical [`ModelStructure`].
///
/// Total function: any subset of fields may be absent or malformed and the
/// result is still a well-formed shape for the validators to score.
///
/// # Examples
///
/// ```rust
/// use optval_core::extract::extract_structure;
/// use serde_json::json;
///
/// let model = extract_structure(&json!({}));
/// assert!(model.variables.is_empty());
/// assert!(!model.objective.present);
/// ```
pub fn extract_structure(payload: &Value) -> ModelStructure {
    ModelStructure {
        variables: payload
            .get("variables")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(extract_variable).collect())
            .unwrap_or_default(),
        constraints: payload
            .get("constraints")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(extract_constraint).collect())
            .unwrap_or_default(),
        objective: payload
            .get("objective")
            .filter(|v| !v.is_null())
            .map(extract_objective)
            .unwrap_or_else(Objective::absent),
        metadata: extract_metadata(payload.get("metadata")),
    }
}

fn extract_variable(item: &Value) -> Variable {
    Variable {
        name: string_field(item, "name"),
        var_type: string_field(item, "type"),
        bounds: item.get("bounds").filter(|v| !v.is_null()).cloned(),
    }
}

fn extract_constraint(item: &Value) -> Constraint {
    Constraint {
        name: string_field(item, "name"),
        variables: name_list(item.get("variables")),
        coefficients: value_list(item.get("coefficients")),
        rhs: item.get("rhs").cloned().unwrap_or(Value::Null),
        sense: string_field(item, "sense"),
    }
}

fn extract_objective(item: &Value) -> Objective {
    Objective {
        present: true,
        obj_type: string_field(item, "type"),
        variables: name_list(item.get("variables")),
        coefficients: value_list(item.get("coefficients")),
    }
}

fn extract_metadata(item: Option<&Value>) -> ModelMetadata {
    let item = match item {
        Some(v) => v,
        None => return ModelMetadata::default(),
    };
    ModelMetadata {
        tier: string_field(item, "tier"),
        expected_quality: item
            .get("expected_quality")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        total_cost: item.get("total_cost").and_then(Value::as_f64).unwrap_or(0.0),
    }
}

/// Read a field as a string, coercing scalars (a numeric name is still a
/// name) and defaulting to empty.
fn string_field(item: &Value, field: &str) -> String {
    match item.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn name_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn value_list(value: Option<&Value>) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

//! # Value Coercer
//!
//! Bidirectional mapping between wire-level JSON values and the scalar
//! shapes the storage engine understands. The write direction flattens
//! structured values to JSON text and booleans to 0/1 integers; the read
//! direction re-inflates them during row hydration.
//!
//! The read direction's 0/1 -> boolean reinterpretation is a heuristic, not
//! a schema-aware decision: an integer column whose value happens to be 0
//! or 1 comes back as a boolean. Documented, deliberate behavior.

use serde_json::{Map, Value};

use super::engine::Row;

/// A storage-level scalar, bound as a statement parameter or returned in a
/// result row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Write direction: wire value to storage scalar. Pure and total.
pub fn to_storage(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(true) => SqlValue::Integer(1),
        Value::Bool(false) => SqlValue::Integer(0),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        // JSON-decoded payloads are acyclic, so serialization cannot fail.
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

/// Read direction: storage scalar back to a wire value. Pure and total.
pub fn from_storage(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(0) => Value::Bool(false),
        SqlValue::Integer(1) => Value::Bool(true),
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        SqlValue::Text(s) => {
            if s.starts_with('{') || s.starts_with('[') {
                serde_json::from_str(&s).unwrap_or(Value::String(s))
            } else {
                Value::String(s)
            }
        }
    }
}

/// Applies the read-direction coercion to every column of a result row.
pub fn hydrate_row(row: Row) -> Map<String, Value> {
    row.into_iter()
        .map(|(column, value)| (column, from_storage(value)))
        .collect()
}

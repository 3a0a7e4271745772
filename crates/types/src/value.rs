//! JSON value helpers shared by the evaluator and the action library.

use serde_json::Value;

/// Condition semantics for a resolved value.
///
/// Null, `false`, zero, and empty strings/collections are falsy; everything
/// else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Renders a value the way it should appear inside interpolated text.
///
/// Strings are emitted bare (no quotes), null becomes the empty string, and
/// compound values fall back to their compact JSON form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

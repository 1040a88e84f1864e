//! Field-presence helpers over loosely shaped store values.
//!
//! Store records carry no schema: the same field may be missing, null, a
//! number in one version and a string in another. Every accessor here makes
//! the presence check explicit and returns `None` instead of guessing.

use serde_json::Value;

/// Truthiness of a stored value.
///
/// Null, `false`, zero, the empty string, and empty arrays or objects are
/// all falsy. Everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Field lookup that treats falsy values as absent.
pub fn truthy<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    value.get(field).filter(|v| is_truthy(v))
}

/// Numeric view of a value. Booleans and strings are not numbers.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Integral view of a value. Floats with a fractional part are rejected.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

//! Request body decoding shared by the handlers.

use serde_json::{Map, Value};

use crate::{Result, ServiceError};

/// Decode a request body as a JSON object.
///
/// A missing or blank body reads as `{}`. Anything that is not a JSON
/// object is an internal error, not a validation error.
pub(crate) fn json_object(body: Option<&str>) -> Result<Map<String, Value>> {
    let raw = match body {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(Map::new()),
    };

    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ServiceError::Internal(
            "request body is not a JSON object".to_string(),
        )),
        Err(e) => Err(ServiceError::Internal(format!(
            "request body is not valid JSON: {}",
            e
        ))),
    }
}

/// Python-style truthiness, used where an absent, null or empty value
/// counts as "not given".
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

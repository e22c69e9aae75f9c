//! Lenient JSON scalar helpers.

use serde_json::Value;

/// Text of a JSON string or number; `None` for anything else.
pub fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//! Recursive key-based redaction, shared by the formatter and the logging
//! layer's secret scrubbing (`infrastructure::logging::secret_scrubbing`).

use serde_json::Value;

const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "password", "token", "key", "secret", "credential", "auth", "api_key", "apikey",
    "access_token", "refresh_token",
];

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEY_FRAGMENTS.iter().any(|frag| lower.contains(frag))
}

/// Walk `value`, replacing any object value whose key looks sensitive with
/// the literal string `"[REDACTED]"`.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, val) in map {
                if is_sensitive_key(key) {
                    out.insert(key.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    out.insert(key.clone(), sanitize(val));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        other => other.clone(),
    }
}

//! Strict structured-output extraction for AI provider responses.
//!
//! The original Python implementation (`original_source/src/utils/json_parser.py`)
//! scraped JSON out of markdown fences and free text with layered regexes.
//! That is an explicit anti-pattern here: Marcus only accepts a response
//! whose *first* balanced `{...}`/`[...]` parses as JSON and matches the
//! caller's expected shape. Anything else is a hard `AiProvider` error, not
//! a best-effort salvage.

use crate::error_handling::{ErrorContext, ErrorVariant, MarcusError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Find the first top-level balanced `{...}` or `[...]` span in `text` and
/// parse it as JSON. Returns `None` if no balanced span exists.
fn find_balanced_json(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find(['{', '['])?;
    let open = bytes[start] as char;
    let close = if open == '{' { '}' } else { ']' };

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse `raw` as a single JSON document of type `T`, rejecting anything the
/// model emitted outside the first balanced structure (preamble, trailing
/// commentary, markdown fences).
pub fn extract<T: DeserializeOwned>(raw: &str, operation: &str) -> Result<T, MarcusError> {
    let span = find_balanced_json(raw).ok_or_else(|| {
        MarcusError::new(
            ErrorVariant::AiProvider,
            "response did not contain a balanced JSON structure",
            ErrorContext::new(operation),
        )
    })?;

    serde_json::from_str::<Value>(span)
        .map_err(|e| {
            MarcusError::new(
                ErrorVariant::AiProvider,
                format!("response was not valid JSON: {e}"),
                ErrorContext::new(operation),
            )
        })
        .and_then(|value| {
            serde_json::from_value::<T>(value).map_err(|e| {
                MarcusError::new(
                    ErrorVariant::AiProvider,
                    format!("response JSON did not match expected schema: {e}"),
                    ErrorContext::new(operation),
                )
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Advice {
        analysis: String,
    }

    #[test]
    fn extracts_bare_json_object() {
        let raw = r#"{"analysis": "retry with backoff"}"#;
        let parsed: Advice = extract(raw, "ai.generate_blocker_advice").unwrap();
        assert_eq!(parsed.analysis, "retry with backoff");
    }

    #[test]
    fn extracts_json_embedded_in_markdown_fence() {
        let raw = "Here you go:\n```json\n{\"analysis\": \"check credentials\"}\n```\nLet me know.";
        let parsed: Advice = extract(raw, "op").unwrap();
        assert_eq!(parsed.analysis, "check credentials");
    }

    #[test]
    fn rejects_response_with_no_json() {
        let raw = "I cannot help with that right now.";
        let result: Result<Advice, _> = extract(raw, "op");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_json_missing_required_field() {
        let raw = r#"{"other": "value"}"#;
        let result: Result<Advice, _> = extract(raw, "op");
        assert!(result.is_err());
    }

    #[test]
    fn ignores_braces_inside_string_values() {
        let raw = r#"{"analysis": "error like {not json}"}"#;
        let parsed: Advice = extract(raw, "op").unwrap();
        assert_eq!(parsed.analysis, "error like {not json}");
    }
}

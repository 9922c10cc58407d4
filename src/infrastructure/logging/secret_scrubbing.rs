//! Log-message secret scrubbing. The teacher's equivalent
//! (`infrastructure/logging/secret_scrubbing.rs`) matches key patterns with
//! `regex`, but `regex` is not among the teacher's declared dependencies —
//! rather than fabricate one, this scans for the same sensitive key
//! fragments `formatting::sanitize` redacts in structured payloads, applied
//! to free-text log lines instead of JSON values.

const SENSITIVE_KEY_FRAGMENTS: &[&str] =
    &["password", "token", "key", "secret", "credential", "authorization", "bearer"];

/// Redact the value following a `key: value` or `key=value` occurrence of any
/// sensitive fragment, case-insensitively, up to the next whitespace/comma/
/// brace/quote.
pub fn scrub_message(message: &str) -> String {
    let lower = message.to_lowercase();
    let mut result = String::with_capacity(message.len());
    let mut cursor = 0;

    while cursor < message.len() {
        let rest = &lower[cursor..];
        let hit = SENSITIVE_KEY_FRAGMENTS.iter().filter_map(|frag| rest.find(frag).map(|pos| (pos, frag))).min_by_key(|(pos, _)| *pos);

        let Some((offset, frag)) = hit else {
            result.push_str(&message[cursor..]);
            break;
        };

        let key_start = cursor + offset;
        let key_end = key_start + frag.len();
        result.push_str(&message[cursor..key_end]);

        let after_key = &message[key_end..];
        let sep_len = after_key.chars().take_while(|c| c.is_whitespace() || *c == '"' || *c == '\'').count();
        let Some(sep_char) = after_key[sep_len..].chars().next() else {
            cursor = key_end;
            continue;
        };
        if sep_char != ':' && sep_char != '=' {
            cursor = key_end;
            continue;
        }

        let after_sep = &after_key[sep_len + sep_char.len_utf8()..];
        let value_start_offset = after_sep.chars().take_while(|c| c.is_whitespace() || *c == '"' || *c == '\'').count();
        let value_region = &after_sep[value_start_offset..];
        let value_len = value_region
            .char_indices()
            .find(|(_, c)| c.is_whitespace() || matches!(c, ',' | '}' | '"' | '\''))
            .map_or(value_region.len(), |(i, _)| i);

        result.push_str(&after_key[..sep_len + sep_char.len_utf8() + value_start_offset]);
        result.push_str("[REDACTED]");

        cursor = key_end + sep_len + sep_char.len_utf8() + value_start_offset + value_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_password_field() {
        let scrubbed = scrub_message(r#"{"password": "hunter2"}"#);
        assert!(!scrubbed.contains("hunter2"));
        assert!(scrubbed.contains("[REDACTED]"));
    }

    #[test]
    fn redacts_api_key_assignment() {
        let scrubbed = scrub_message("api_key=sk-ant-test123 other=fine");
        assert!(!scrubbed.contains("sk-ant-test123"));
        assert!(scrubbed.contains("other=fine"));
    }

    #[test]
    fn leaves_ordinary_messages_untouched() {
        let message = "agent a1 picked up task T1";
        assert_eq!(scrub_message(message), message);
    }
}

//! Redaction of sensitive header/cookie values before they reach an LLM
//! prompt or a serialized `WorkflowDefinition` (spec.md §6, §8 "redaction").

use std::collections::HashMap;

/// Header names (lowercase) whose values are never forwarded verbatim.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
    "x-csrf-token",
    "x-xsrf-token",
    "csrf-token",
    "x-csrftoken",
];

/// Whether a header name (any case) is in the sensitive set.
pub fn is_sensitive_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SENSITIVE_HEADERS.contains(&lower.as_str())
}

/// Redact a single header value. `Authorization: Bearer <token>` becomes
/// `Bearer [REDACTED_TOKEN]`; anything else sensitive becomes
/// `<first 8 chars>...[REDACTED]` (or just `[REDACTED]` if shorter than 8).
pub fn redact_value(value: &str) -> String {
    if let Some(token) = value.strip_prefix("Bearer ") {
        if !token.is_empty() {
            return "Bearer [REDACTED_TOKEN]".to_string();
        }
    }
    if value.len() <= 8 {
        "[REDACTED]".to_string()
    } else {
        format!("{}...[REDACTED]", &value[..8])
    }
}

/// Redact every sensitive header in a header map, leaving other headers
/// untouched. Used before headers are interpolated into any gateway prompt
/// or attached to a persisted `WorkflowDefinition`.
pub fn redact_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| {
            if is_sensitive_header(k) {
                (k.clone(), redact_value(v))
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_is_redacted_with_scheme_preserved() {
        assert_eq!(
            redact_value("Bearer sk_live_abcdef123456"),
            "Bearer [REDACTED_TOKEN]"
        );
    }

    #[test]
    fn long_non_bearer_value_keeps_prefix() {
        assert_eq!(redact_value("sessionid=abcdef123456"), "sessionid...[REDACTED]");
    }

    #[test]
    fn short_value_is_fully_redacted() {
        assert_eq!(redact_value("abc"), "[REDACTED]");
    }

    #[test]
    fn sensitive_header_detection_is_case_insensitive() {
        assert!(is_sensitive_header("Authorization"));
        assert!(is_sensitive_header("X-API-KEY"));
        assert!(!is_sensitive_header("content-type"));
    }

    #[test]
    fn redact_headers_only_touches_sensitive_entries() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer abc123xyz789".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let redacted = redact_headers(&headers);
        assert_eq!(redacted["Authorization"], "Bearer [REDACTED_TOKEN]");
        assert_eq!(redacted["Content-Type"], "application/json");
    }

    #[test]
    fn no_substring_of_sensitive_value_survives() {
        let secret = "sk_live_superlongsecretvalue";
        let mut headers = HashMap::new();
        headers.insert("Cookie".to_string(), secret.to_string());
        let redacted = redact_headers(&headers);
        assert!(!redacted["Cookie"].contains(secret));
    }
}

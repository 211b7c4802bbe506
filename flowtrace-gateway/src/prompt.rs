//! Tolerant JSON extraction from model responses, and the system-prompt
//! boilerplate shared by every gateway function.

use crate::error::GatewayError;
use serde::de::DeserializeOwned;

/// Parse JSON out of a model's raw text response, tolerating a fenced code
/// block (```json ... ``` or ``` ... ```) around the payload as well as a
/// plain JSON body (spec.md §6).
pub fn extract_json(text: &str) -> Result<serde_json::Value, GatewayError> {
    let trimmed = text.trim();
    let candidate = if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let after_fence = after_fence
            .strip_prefix("json")
            .or_else(|| after_fence.strip_prefix("JSON"))
            .unwrap_or(after_fence);
        let after_fence = after_fence.strip_prefix('\n').unwrap_or(after_fence);
        match after_fence.find("```") {
            Some(end) => &after_fence[..end],
            None => after_fence,
        }
    } else {
        trimmed
    };
    serde_json::from_str(candidate.trim())
        .map_err(|e| GatewayError::Parse(format!("{e}: {}", truncate(candidate, 200))))
}

/// Parse a model's raw text response directly into a typed response.
pub fn parse_response<T: DeserializeOwned>(text: &str) -> Result<T, GatewayError> {
    let value = extract_json(text)?;
    serde_json::from_value(value)
        .map_err(|e| GatewayError::Parse(format!("schema mismatch: {e}")))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max])
    }
}

/// A shared system prompt prefix instructing the model to respond with
/// nothing but the JSON payload matching the function's schema.
pub fn system_prompt(function_name: &str) -> String {
    format!(
        "You are the {function_name} function of a browser-workflow analysis pipeline. \
         Respond with a single JSON object matching the declared schema and nothing else. \
         Do not include explanations outside the JSON."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        ok: bool,
    }

    #[test]
    fn parses_plain_json() {
        let p: Payload = parse_response(r#"{"ok": true}"#).unwrap();
        assert_eq!(p, Payload { ok: true });
    }

    #[test]
    fn parses_fenced_json_block() {
        let text = "Here you go:\n```json\n{\"ok\": true}\n```\nThanks.";
        let p: Payload = parse_response(text).unwrap();
        assert_eq!(p, Payload { ok: true });
    }

    #[test]
    fn parses_bare_fenced_block() {
        let text = "```\n{\"ok\": false}\n```";
        let p: Payload = parse_response(text).unwrap();
        assert_eq!(p, Payload { ok: false });
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = extract_json("not json at all").unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }
}

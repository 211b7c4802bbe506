//! Data-flow candidate discovery (spec.md §4.4, "Data-flow candidate
//! discovery"): for every step pair `(from, to)` with `from < to`,
//! flatten `from`'s response body and look for each value reappearing
//! somewhere in `to`'s request.

use flowtrace_gateway::schema::DataFlowCandidate;
use flowtrace_types::{flatten_json, NetworkEvent, ParamLocation};

const MIN_VALUE_LEN: usize = 2;

/// Every occurrence of a value from `from`'s response body inside `to`'s
/// request (path segments, query values, body leaves, header values).
pub fn discover_pair(from: &NetworkEvent, to: &NetworkEvent) -> Vec<DataFlowCandidate> {
    let Some(body) = from.response_body.as_deref() else {
        return vec![];
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return vec![];
    };
    let sources: Vec<(String, String)> = flatten_json(&value)
        .into_iter()
        .filter(|(_, v)| v.len() >= MIN_VALUE_LEN)
        .collect();
    if sources.is_empty() {
        return vec![];
    }

    let mut candidates = vec![];
    let parsed = url::Url::parse(&to.url).ok();

    if let Some(parsed) = &parsed {
        if let Some(segments) = parsed.path_segments() {
            for (i, segment) in segments.enumerate() {
                for (source_path, source_value) in &sources {
                    if segment == source_value {
                        candidates.push(DataFlowCandidate {
                            source_json_path: source_path.clone(),
                            target_location: ParamLocation::Path,
                            target_key: format!("segment_{i}"),
                        });
                    }
                }
            }
        }
        for (key, value) in parsed.query_pairs() {
            for (source_path, source_value) in &sources {
                if value == *source_value {
                    candidates.push(DataFlowCandidate {
                        source_json_path: source_path.clone(),
                        target_location: ParamLocation::Query,
                        target_key: key.to_string(),
                    });
                }
            }
        }
    }

    if let Some(to_body) = &to.request_body {
        if let Ok(to_json) = serde_json::from_str::<serde_json::Value>(to_body) {
            for (to_path, to_value) in flatten_json(&to_json) {
                for (source_path, source_value) in &sources {
                    if to_value == *source_value {
                        candidates.push(DataFlowCandidate {
                            source_json_path: source_path.clone(),
                            target_location: ParamLocation::Body,
                            target_key: to_path.clone(),
                        });
                    }
                }
            }
        }
    }

    for (header_name, header_value) in &to.request_headers {
        for (source_path, source_value) in &sources {
            if header_value == source_value {
                candidates.push(DataFlowCandidate {
                    source_json_path: source_path.clone(),
                    target_location: ParamLocation::Header,
                    target_key: header_name.to_ascii_lowercase(),
                });
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn event(url: &str, body: Option<&str>, response_body: Option<&str>, headers: &[(&str, &str)]) -> NetworkEvent {
        NetworkEvent {
            timestamp: 0,
            method: "GET".to_string(),
            url: url.to_string(),
            request_headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            request_body: body.map(str::to_string),
            response_status: 200,
            response_headers: HashMap::new(),
            response_body: response_body.map(str::to_string),
        }
    }

    #[test]
    fn finds_path_segment_flow() {
        let from = event("https://api.example.com/login", None, Some(r#"{"userId":"u-42"}"#), &[]);
        let to = event("https://api.example.com/users/u-42/profile", None, None, &[]);
        let flows = discover_pair(&from, &to);
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].source_json_path, "userId");
        assert_eq!(flows[0].target_key, "segment_1");
    }

    #[test]
    fn finds_query_param_flow() {
        let from = event("https://api.example.com/search", None, Some(r#"{"sessionToken":"tok-123456"}"#), &[]);
        let to = event("https://api.example.com/results?session=tok-123456", None, None, &[]);
        let flows = discover_pair(&from, &to);
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].target_key, "session");
    }

    #[test]
    fn short_values_are_ignored() {
        let from = event("https://api.example.com/a", None, Some(r#"{"page":"1"}"#), &[]);
        let to = event("https://api.example.com/b?page=1", None, None, &[]);
        let flows = discover_pair(&from, &to);
        assert!(flows.is_empty());
    }

    #[test]
    fn missing_response_body_yields_no_candidates() {
        let from = event("https://api.example.com/a", None, None, &[]);
        let to = event("https://api.example.com/b?x=1", None, None, &[]);
        assert!(discover_pair(&from, &to).is_empty());
    }
}

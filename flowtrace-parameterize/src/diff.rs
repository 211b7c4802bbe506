//! Per-step diffing across matched sessions (spec.md §4.3, "Per-step
//! diffing"): path segments, query parameters, JSON body, and headers.

use flowtrace_gateway::schema::VaryingPart;
use flowtrace_types::{flatten_json, is_sensitive_header, redact_value, ParamLocation, Session};
use std::collections::{BTreeMap, HashSet};

/// Headers that vary for reasons unrelated to user input and must never
/// be surfaced as parameters.
const EPHEMERAL_HEADER_PREFIXES: &[&str] = &["accept", "sec-ch-", "sec-fetch-"];
const EPHEMERAL_HEADER_NAMES: &[&str] = &[
    "content-length",
    "date",
    "user-agent",
    "cache-control",
    "if-none-match",
    "etag",
];
const EPHEMERAL_HEADER_SUBSTRINGS: &[&str] = &["trace-id", "traceparent", "correlation-id", "request-id"];

fn is_ephemeral_header(name_lower: &str) -> bool {
    EPHEMERAL_HEADER_NAMES.contains(&name_lower)
        || EPHEMERAL_HEADER_PREFIXES.iter().any(|p| name_lower.starts_with(p))
        || EPHEMERAL_HEADER_SUBSTRINGS.iter().any(|s| name_lower.contains(s))
}

fn parsed_url(url: &str) -> Option<url::Url> {
    url::Url::parse(url).ok()
}

/// Diff path segments across the matched sessions' request URLs.
/// Compares positionally up to the shortest path's segment count.
pub fn diff_path_segments(sessions: &[Session], matched: &[(usize, usize)], step_order: u32) -> Vec<VaryingPart> {
    let segment_lists: Vec<Vec<String>> = matched
        .iter()
        .filter_map(|&(session_idx, net_idx)| {
            let event = &sessions[session_idx].network_events[net_idx];
            parsed_url(&event.url).map(|u| {
                u.path_segments()
                    .map(|s| s.map(str::to_string).collect::<Vec<_>>())
                    .unwrap_or_default()
            })
        })
        .collect();

    let min_len = segment_lists.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = vec![];
    for i in 0..min_len {
        let values: Vec<String> = segment_lists.iter().map(|s| s[i].clone()).collect();
        let distinct: HashSet<&String> = values.iter().filter(|v| !v.is_empty()).collect();
        if distinct.len() > 1 {
            out.push(VaryingPart {
                step_order,
                location: ParamLocation::Path,
                key: format!("segment_{i}"),
                observed_values: dedup_sorted(values),
            });
        }
    }
    out
}

/// Diff query parameters across the matched sessions' request URLs.
pub fn diff_query_params(sessions: &[Session], matched: &[(usize, usize)], step_order: u32) -> Vec<VaryingPart> {
    let mut per_key: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for &(session_idx, net_idx) in matched {
        let event = &sessions[session_idx].network_events[net_idx];
        let Some(parsed) = parsed_url(&event.url) else {
            continue;
        };
        for (key, value) in parsed.query_pairs() {
            per_key.entry(key.into_owned()).or_default().push(value.into_owned());
        }
    }
    per_key
        .into_iter()
        .filter_map(|(key, values)| {
            let distinct: HashSet<&String> = values.iter().collect();
            if distinct.len() > 1 {
                Some(VaryingPart {
                    step_order,
                    location: ParamLocation::Query,
                    key,
                    observed_values: dedup_sorted(values),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Diff JSON request bodies across the matched sessions. If any matched
/// session's body is missing or fails to parse as JSON, the whole body
/// is instead compared as an opaque string under the key `_raw`.
pub fn diff_body(sessions: &[Session], matched: &[(usize, usize)], step_order: u32) -> Vec<VaryingPart> {
    let bodies: Vec<Option<&str>> = matched
        .iter()
        .map(|&(session_idx, net_idx)| sessions[session_idx].network_events[net_idx].request_body.as_deref())
        .collect();

    if bodies.iter().all(Option::is_none) {
        return vec![];
    }

    let parsed: Option<Vec<serde_json::Value>> = bodies
        .iter()
        .map(|b| b.and_then(|s| serde_json::from_str(s).ok()))
        .collect();

    match parsed {
        Some(values) => {
            let mut per_path: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for value in &values {
                for (path, leaf) in flatten_json(value) {
                    per_path.entry(path).or_default().push(leaf);
                }
            }
            per_path
                .into_iter()
                .filter_map(|(path, leaves)| {
                    let distinct: HashSet<&String> = leaves.iter().collect();
                    if distinct.len() > 1 {
                        Some(VaryingPart {
                            step_order,
                            location: ParamLocation::Body,
                            key: path,
                            observed_values: dedup_sorted(leaves),
                        })
                    } else {
                        None
                    }
                })
                .collect()
        }
        None => {
            let raw: Vec<String> = bodies.iter().map(|b| b.unwrap_or("").to_string()).collect();
            let distinct: HashSet<&String> = raw.iter().collect();
            if distinct.len() > 1 {
                vec![VaryingPart {
                    step_order,
                    location: ParamLocation::Body,
                    key: "_raw".to_string(),
                    observed_values: dedup_sorted(raw),
                }]
            } else {
                vec![]
            }
        }
    }
}

/// Diff request headers across the matched sessions, filtering out
/// ephemeral transport/browser headers.
pub fn diff_headers(sessions: &[Session], matched: &[(usize, usize)], step_order: u32) -> Vec<VaryingPart> {
    let mut per_key: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for &(session_idx, net_idx) in matched {
        let event = &sessions[session_idx].network_events[net_idx];
        for (key, value) in &event.request_headers {
            let lower = key.to_ascii_lowercase();
            if is_ephemeral_header(&lower) {
                continue;
            }
            let value = if is_sensitive_header(&lower) { redact_value(value) } else { value.clone() };
            per_key.entry(lower).or_default().push(value);
        }
    }
    per_key
        .into_iter()
        .filter_map(|(key, values)| {
            let distinct: HashSet<&String> = values.iter().collect();
            if distinct.len() > 1 {
                Some(VaryingPart {
                    step_order,
                    location: ParamLocation::Header,
                    key,
                    observed_values: dedup_sorted(values),
                })
            } else {
                None
            }
        })
        .collect()
}

fn dedup_sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values.dedup();
    values
}

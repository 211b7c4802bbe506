//! Heuristic authentication-scheme classification (spec.md §4.5,
//! "Analysis" and "Classification").

use crate::cookies::parse_cookies;
use flowtrace_types::{AuthKind, AuthPattern, CredentialField, CredentialLocation, Session};
use std::collections::{HashMap, HashSet};

const BENIGN_HEADERS: &[&str] = &[
    "host",
    "content-type",
    "content-length",
    "accept-encoding",
    "accept-language",
    "connection",
    "origin",
    "referer",
    "cache-control",
    "pragma",
    "upgrade-insecure-requests",
    "dnt",
    "cookie",
];
const BENIGN_HEADER_PREFIXES: &[&str] = &["sec-ch-", "sec-fetch-", "accept"];

const API_KEY_HEADER_NAMES: &[&str] = &["x-api-key", "api-key", "apikey"];
const AUTH_ADJACENT_QUERY_PARAMS: &[&str] = &["key", "api_key", "token", "access_token", "auth"];
const SESSION_COOKIE_NAMES: &[&str] = &["session", "sessionid", "sid", "connect.sid", "jsessionid", "phpsessid", "_session"];
const CSRF_HEADER_NAMES: &[&str] = &["x-csrf-token", "x-xsrf-token", "csrf-token", "x-csrftoken"];

fn is_benign_header(name_lower: &str) -> bool {
    BENIGN_HEADERS.contains(&name_lower) || BENIGN_HEADER_PREFIXES.iter().any(|p| name_lower.starts_with(p))
}

/// Names observed per session for one of the three tallied categories:
/// non-benign headers, cookie names, and auth-adjacent query params.
struct Tally {
    headers: Vec<HashSet<String>>,
    cookies: Vec<HashSet<String>>,
    query_params: Vec<HashSet<String>>,
}

fn tally(sessions: &[Session]) -> Tally {
    let mut headers = vec![];
    let mut cookies = vec![];
    let mut query_params = vec![];

    for session in sessions {
        let mut session_headers = HashSet::new();
        let mut session_cookies = HashSet::new();
        let mut session_query = HashSet::new();

        for event in &session.network_events {
            for key in event.request_headers.keys() {
                let lower = key.to_ascii_lowercase();
                if !is_benign_header(&lower) {
                    session_headers.insert(lower);
                }
            }
            if let Some(cookie_header) = event.header("cookie") {
                for (name, _) in parse_cookies(cookie_header) {
                    session_cookies.insert(name);
                }
            }
            if let Ok(parsed) = url::Url::parse(&event.url) {
                for (key, _) in parsed.query_pairs() {
                    let lower = key.to_ascii_lowercase();
                    if AUTH_ADJACENT_QUERY_PARAMS.contains(&lower.as_str()) {
                        session_query.insert(lower);
                    }
                }
            }
        }

        headers.push(session_headers);
        cookies.push(session_cookies);
        query_params.push(session_query);
    }

    Tally { headers, cookies, query_params }
}

fn consistent(sets: &[HashSet<String>]) -> HashSet<String> {
    let Some((first, rest)) = sets.split_first() else {
        return HashSet::new();
    };
    first.iter().filter(|name| rest.iter().all(|s| s.contains(*name))).cloned().collect()
}

fn bearer_header_value_exists(sessions: &[Session]) -> bool {
    sessions.iter().any(|s| {
        s.network_events
            .iter()
            .any(|e| e.header("authorization").is_some_and(|v| v.starts_with("Bearer ")))
    })
}

fn csrf_companion_field(consistent_headers: &HashSet<String>, consistent_cookies: &HashSet<String>) -> Option<CredentialField> {
    if let Some(name) = consistent_headers.iter().find(|h| CSRF_HEADER_NAMES.contains(&h.as_str())) {
        return Some(CredentialField {
            name: name.clone(),
            description: "CSRF token sent alongside the primary credential".to_string(),
            location: CredentialLocation::Header,
        });
    }
    if let Some(name) = consistent_cookies.iter().find(|c| {
        let lower = c.to_ascii_lowercase();
        lower.contains("csrf") || lower.contains("xsrf")
    }) {
        return Some(CredentialField {
            name: name.clone(),
            description: "CSRF token sent alongside the primary credential".to_string(),
            location: CredentialLocation::Cookie,
        });
    }
    None
}

/// Classify the authentication scheme heuristically across all sessions.
pub fn classify(sessions: &[Session]) -> AuthPattern {
    if sessions.is_empty() {
        return AuthPattern::none();
    }

    let tally = tally(sessions);
    let consistent_headers = consistent(&tally.headers);
    let consistent_cookies = consistent(&tally.cookies);
    let consistent_query = consistent(&tally.query_params);

    let csrf_field = csrf_companion_field(&consistent_headers, &consistent_cookies);

    let mut pattern = if consistent_headers.contains("authorization") && bearer_header_value_exists(sessions) {
        AuthPattern {
            kind: AuthKind::Bearer,
            credential_fields: vec![CredentialField {
                name: "authorization".to_string(),
                description: "Bearer token sent in the Authorization header".to_string(),
                location: CredentialLocation::Header,
            }],
        }
    } else if let Some(name) = API_KEY_HEADER_NAMES.iter().find(|h| consistent_headers.contains(**h)) {
        AuthPattern {
            kind: AuthKind::ApiKey,
            credential_fields: vec![CredentialField {
                name: name.to_string(),
                description: "Static API key sent as a request header".to_string(),
                location: CredentialLocation::Header,
            }],
        }
    } else if !consistent_query.is_empty() {
        AuthPattern {
            kind: AuthKind::ApiKey,
            credential_fields: consistent_query
                .iter()
                .map(|name| CredentialField {
                    name: name.clone(),
                    description: "Static API key sent as a query parameter".to_string(),
                    location: CredentialLocation::Query,
                })
                .collect(),
        }
    } else if consistent_cookies.iter().any(|c| SESSION_COOKIE_NAMES.contains(&c.to_ascii_lowercase().as_str())) {
        AuthPattern {
            kind: AuthKind::Cookie,
            credential_fields: consistent_cookies
                .iter()
                .map(|name| CredentialField {
                    name: name.clone(),
                    description: "Session cookie".to_string(),
                    location: CredentialLocation::Cookie,
                })
                .collect(),
        }
    } else if !consistent_cookies.is_empty() {
        AuthPattern {
            kind: AuthKind::Cookie,
            credential_fields: consistent_cookies
                .iter()
                .map(|name| CredentialField {
                    name: name.clone(),
                    description: "Cookie consistently present across recordings".to_string(),
                    location: CredentialLocation::Cookie,
                })
                .collect(),
        }
    } else {
        AuthPattern::none()
    };

    if let Some(csrf) = csrf_field {
        if !pattern.credential_fields.iter().any(|f| f.name == csrf.name && f.location == csrf.location) {
            pattern.credential_fields.push(csrf);
        }
    }

    pattern
}

//! The heuristic pass: rules that can drop an event without ever
//! consulting the gateway (spec.md §4.1). Never fails.

use flowtrace_types::{NetworkEvent, Session};
use std::collections::HashSet;

/// Hosts (exact match or suffix match) known to carry analytics/tracking
/// traffic rather than workflow-relevant requests.
pub const TRACKING_DOMAINS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "doubleclick.net",
    "facebook.com",
    "connect.facebook.net",
    "segment.io",
    "cdn.segment.com",
    "mixpanel.com",
    "hotjar.com",
    "fullstory.com",
    "sentry.io",
    "amplitude.com",
    "intercom.io",
    "bugsnag.com",
    "newrelic.com",
    "datadoghq.com",
    "clarity.ms",
];

/// `content-type` prefixes that mark a static asset response.
pub const STATIC_CONTENT_TYPE_PREFIXES: &[&str] = &[
    "image/",
    "font/",
    "text/css",
    "application/javascript",
    "text/javascript",
    "application/font",
    "application/x-font",
];

/// URL path extensions that mark a static asset request.
pub const STATIC_EXTENSIONS: &[&str] = &[
    ".css", ".js", ".map", ".woff", ".woff2", ".ttf", ".eot", ".ico", ".png", ".jpg", ".jpeg",
    ".gif", ".svg", ".webp",
];

/// Whether `host` is on the tracking-domain blocklist, by exact match or
/// domain-suffix match (`sub.segment.io` matches `segment.io`).
pub fn is_tracking_host(host: &str) -> bool {
    TRACKING_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

/// Whether a network event's response looks like a static asset, by
/// content-type prefix or URL path extension.
pub fn is_static_asset(event: &NetworkEvent) -> bool {
    if let Some(ct) = event.content_type() {
        if STATIC_CONTENT_TYPE_PREFIXES
            .iter()
            .any(|prefix| ct.starts_with(prefix))
        {
            return true;
        }
    }
    let path = url::Url::parse(&event.url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| event.url.clone());
    STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn host_of(event: &NetworkEvent) -> String {
    url::Url::parse(&event.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Indices of `session.network_events` that survive the heuristic pass.
/// When `all_sessions` has two or more entries, any `(method, url)` pair
/// appearing identically in every session is additionally dropped as
/// framework/analytics noise.
pub fn heuristic_survivors(session: &Session, all_sessions: &[Session]) -> Vec<usize> {
    let globally_identical = if all_sessions.len() >= 2 {
        globally_identical_calls(all_sessions)
    } else {
        HashSet::new()
    };

    session
        .network_events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.method.to_ascii_uppercase() != "OPTIONS")
        .filter(|(_, event)| !is_tracking_host(&host_of(event)))
        .filter(|(_, event)| !is_static_asset(event))
        .filter(|(_, event)| {
            !globally_identical.contains(&(event.method.to_ascii_uppercase(), event.url.clone()))
        })
        .map(|(i, _)| i)
        .collect()
}

/// `(method, url)` pairs that appear in every session's network events.
fn globally_identical_calls(all_sessions: &[Session]) -> HashSet<(String, String)> {
    let mut iter = all_sessions.iter();
    let Some(first) = iter.next() else {
        return HashSet::new();
    };
    let mut candidates: HashSet<(String, String)> = first
        .network_events
        .iter()
        .map(|e| (e.method.to_ascii_uppercase(), e.url.clone()))
        .collect();
    for session in iter {
        let this_session: HashSet<(String, String)> = session
            .network_events
            .iter()
            .map(|e| (e.method.to_ascii_uppercase(), e.url.clone()))
            .collect();
        candidates.retain(|pair| this_session.contains(pair));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flowtrace_types::SessionId;
    use std::collections::HashMap;

    fn event(method: &str, url: &str) -> NetworkEvent {
        NetworkEvent {
            timestamp: 0,
            method: method.to_string(),
            url: url.to_string(),
            request_headers: HashMap::new(),
            request_body: None,
            response_status: 200,
            response_headers: HashMap::new(),
            response_body: None,
        }
    }

    fn session(id: &str, events: Vec<NetworkEvent>) -> Session {
        Session {
            id: SessionId::new(id),
            workflow_name: "wf".to_string(),
            url: "https://example.com".to_string(),
            started_at: 0,
            ended_at: 1000,
            recorded_at: Utc::now(),
            dom_events: vec![],
            network_events: events,
            correlations: None,
        }
    }

    #[test]
    fn tracking_host_matches_suffix() {
        assert!(is_tracking_host("www.google-analytics.com"));
        assert!(is_tracking_host("google-analytics.com"));
        assert!(!is_tracking_host("api.example.com"));
    }

    #[test]
    fn options_requests_are_dropped() {
        let s = session("s1", vec![event("OPTIONS", "https://api.example.com/x")]);
        assert!(heuristic_survivors(&s, &[]).is_empty());
    }

    #[test]
    fn static_extension_is_dropped() {
        let s = session("s1", vec![event("GET", "https://cdn.example.com/app.css")]);
        assert!(heuristic_survivors(&s, &[]).is_empty());
    }

    #[test]
    fn globally_identical_calls_across_sessions_are_dropped() {
        let s1 = session(
            "s1",
            vec![
                event("GET", "https://api.example.com/config"),
                event("GET", "https://api.example.com/orders?q=1234"),
            ],
        );
        let s2 = session(
            "s2",
            vec![
                event("GET", "https://api.example.com/config"),
                event("GET", "https://api.example.com/orders?q=5678"),
            ],
        );
        let all = [s1.clone(), s2.clone()];
        let survivors = heuristic_survivors(&s1, &all);
        assert_eq!(survivors, vec![1]);
    }

    #[test]
    fn tracking_host_and_static_asset_survive_single_session() {
        let s = session("s1", vec![event("GET", "https://api.example.com/orders?q=1")]);
        assert_eq!(heuristic_survivors(&s, &[]), vec![0]);
    }
}

#![deny(missing_docs)]
//! Stage 1 of the analysis pipeline: partition each session's network
//! events into core, supporting, and noise.

mod heuristics;

pub use heuristics::{
    heuristic_survivors, is_static_asset, is_tracking_host, STATIC_CONTENT_TYPE_PREFIXES,
    STATIC_EXTENSIONS, TRACKING_DOMAINS,
};

use flowtrace_gateway::schema::{ClassifyRequest, DomEventSummary, EventSummary, NoiseClass};
use flowtrace_gateway::Gateway;
use flowtrace_types::Session;

/// The classification of a session's network events, per spec.md §4.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseFilterResult {
    /// Indices into `session.network_events` that realize the user's
    /// intent directly.
    pub core_indices: Vec<usize>,
    /// Indices of auth/session infrastructure that must be preserved.
    pub supporting_indices: Vec<usize>,
    /// How many events were dropped as noise (count only — the contract
    /// never needs their indices).
    pub noise_count: usize,
}

const BODY_PREVIEW_LEN: usize = 200;

fn summarize(session: &Session, indices: &[usize]) -> Vec<EventSummary> {
    indices
        .iter()
        .map(|&i| {
            let event = &session.network_events[i];
            let mut header_names: Vec<String> = event
                .request_headers
                .keys()
                .chain(event.response_headers.keys())
                .cloned()
                .collect();
            header_names.sort();
            header_names.dedup();
            EventSummary {
                index: i,
                method: event.method.clone(),
                url: event.url.clone(),
                status: event.response_status,
                header_names,
                body_preview: event
                    .request_body
                    .as_deref()
                    .or(event.response_body.as_deref())
                    .map(|b| b.chars().take(BODY_PREVIEW_LEN).collect()),
            }
        })
        .collect()
}

fn dom_context(session: &Session) -> Vec<DomEventSummary> {
    session
        .dom_events
        .iter()
        .map(|e| DomEventSummary {
            timestamp: e.timestamp,
            kind: format!("{:?}", e.kind).to_ascii_lowercase(),
            selector: e.primary_selector.clone(),
        })
        .collect()
}

/// Run Stage 1 over one session: heuristic pass, then an LLM classification
/// pass over the survivors. LLM failure degrades every survivor to `core`
/// (spec.md §4.1, "Failure semantics"); any survivor the LLM leaves
/// unclassified defaults to `supporting`.
pub async fn filter(
    gateway: &dyn Gateway,
    session: &Session,
    all_sessions: &[Session],
) -> NoiseFilterResult {
    let survivors = heuristic_survivors(session, all_sessions);
    let noise_count = session.network_events.len() - survivors.len();

    if survivors.is_empty() {
        return NoiseFilterResult {
            core_indices: vec![],
            supporting_indices: vec![],
            noise_count,
        };
    }

    let request = ClassifyRequest {
        events: summarize(session, &survivors),
        dom_context: dom_context(session),
    };

    match gateway.classify(request).await {
        Ok(response) => {
            let mut core_indices = vec![];
            let mut supporting_indices = vec![];
            let mut llm_noise_count = 0usize;
            let classified: std::collections::HashMap<usize, NoiseClass> = response
                .classifications
                .into_iter()
                .map(|c| (c.index, c.class))
                .collect();
            for &index in &survivors {
                match classified.get(&index) {
                    Some(NoiseClass::Core) => core_indices.push(index),
                    Some(NoiseClass::Supporting) => supporting_indices.push(index),
                    Some(NoiseClass::Noise) => llm_noise_count += 1,
                    None => supporting_indices.push(index),
                }
            }
            NoiseFilterResult {
                core_indices,
                supporting_indices,
                noise_count: noise_count + llm_noise_count,
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "noise classification failed, degrading to all-core");
            NoiseFilterResult {
                core_indices: survivors,
                supporting_indices: vec![],
                noise_count,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flowtrace_gateway::mock::MockGateway;
    use flowtrace_gateway::schema::{ClassifyResponse, EventClassification};
    use flowtrace_gateway::GatewayError;
    use flowtrace_types::SessionId;
    use std::collections::HashMap;

    fn net(method: &str, url: &str) -> flowtrace_types::NetworkEvent {
        flowtrace_types::NetworkEvent {
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

    fn session(events: Vec<flowtrace_types::NetworkEvent>) -> Session {
        Session {
            id: SessionId::new("s1"),
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

    #[tokio::test]
    async fn unclassified_survivor_defaults_to_supporting() {
        let gateway = MockGateway::new();
        gateway.push_classify(Ok(ClassifyResponse {
            classifications: vec![],
        }));
        let s = session(vec![net("GET", "https://api.example.com/orders?q=1")]);
        let result = filter(&gateway, &s, &[]).await;
        assert_eq!(result.core_indices, Vec::<usize>::new());
        assert_eq!(result.supporting_indices, vec![0]);
    }

    #[tokio::test]
    async fn llm_failure_degrades_every_survivor_to_core() {
        let gateway = MockGateway::new();
        gateway.push_classify(Err(GatewayError::Transient("boom".to_string())));
        let s = session(vec![net("GET", "https://api.example.com/orders?q=1")]);
        let result = filter(&gateway, &s, &[]).await;
        assert_eq!(result.core_indices, vec![0]);
        assert!(result.supporting_indices.is_empty());
    }

    #[tokio::test]
    async fn classified_events_are_partitioned() {
        let gateway = MockGateway::new();
        gateway.push_classify(Ok(ClassifyResponse {
            classifications: vec![
                EventClassification {
                    index: 0,
                    class: NoiseClass::Core,
                },
                EventClassification {
                    index: 1,
                    class: NoiseClass::Noise,
                },
            ],
        }));
        let s = session(vec![
            net("GET", "https://api.example.com/orders?q=1"),
            net("GET", "https://api.example.com/heartbeat"),
        ]);
        let result = filter(&gateway, &s, &[]).await;
        assert_eq!(result.core_indices, vec![0]);
        assert_eq!(result.noise_count, 1);
    }

    #[tokio::test]
    async fn empty_survivors_skip_the_gateway_call() {
        let gateway = MockGateway::new();
        let s = session(vec![net("OPTIONS", "https://api.example.com/orders")]);
        let result = filter(&gateway, &s, &[]).await;
        assert!(result.core_indices.is_empty());
        assert!(gateway.calls().is_empty());
    }
}

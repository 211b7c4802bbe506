#![deny(missing_docs)]
//! Stage 4 of the analysis pipeline, and the largest: inter-step data
//! dependencies, parallelism, and pagination loops.

mod dataflow;
mod graph;
mod ordering;
mod pagination;
mod stability;

pub use ordering::ordered_core_steps;

use flowtrace_gateway::schema::{ChainCandidate, ValidateChainsRequest};
use flowtrace_gateway::Gateway;
use flowtrace_types::{Correlation, Session, StepInputMapping, StepOrder};
use std::collections::HashMap;

/// One detected dependency edge between two steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// The earlier step, by position in the combined step list.
    pub from_step: usize,
    /// The later step.
    pub to_step: usize,
    /// How values flow from `from_step`'s response into `to_step`'s
    /// request. Empty if a confirmed flow didn't reproduce cross-session
    /// (spec.md §4.4, "Cross-session stability").
    pub input_mappings: Vec<StepInputMapping>,
    /// True if the two steps have no real dependency despite a
    /// coincidental data-flow match.
    pub is_parallel: bool,
    /// True if this edge is better explained as pagination.
    pub is_pagination: bool,
}

/// Everything ChainDetector contributes to the assembled workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainDetectionResult {
    /// Confirmed dependency edges.
    pub chains: Vec<Chain>,
    /// Maximal same-depth step groups, size ≥ 2.
    pub parallel_groups: Vec<Vec<usize>>,
    /// Steps that belong to a pagination loop.
    pub pagination_steps: Vec<usize>,
    /// A topological ordering of `0..stepCount`.
    pub execution_order: Vec<usize>,
}

impl ChainDetectionResult {
    /// `executionOrder` is a permutation of `0..stepCount` — spec.md §4.4
    /// "Output invariants" / §8 "ordering" property.
    pub fn execution_order_is_permutation(&self, step_count: usize) -> bool {
        if self.execution_order.len() != step_count {
            return false;
        }
        let mut seen: Vec<bool> = vec![false; step_count];
        for &n in &self.execution_order {
            if n >= step_count || seen[n] {
                return false;
            }
            seen[n] = true;
        }
        true
    }

    /// Every chain points forward, and every input mapping's source step
    /// is strictly earlier than the step it feeds — spec.md §4.4 "Output
    /// invariants".
    pub fn chains_respect_ordering(&self) -> bool {
        self.chains.iter().all(|c| {
            c.from_step < c.to_step
                && c.input_mappings
                    .iter()
                    .all(|m| (m.source_step.index() as usize) < c.to_step)
        })
    }
}

fn describe(event: &flowtrace_types::NetworkEvent) -> String {
    format!("{} {}", event.method, event.host_path())
}

/// Run Stage 4 over every session. The reference session (`sessions[0]`)
/// supplies the combined step list; later sessions only contribute to
/// the cross-session stability check.
pub async fn detect(
    gateway: &dyn Gateway,
    sessions: &[Session],
    correlations: &[Vec<Correlation>],
    core_indices: &[Vec<usize>],
) -> ChainDetectionResult {
    if sessions.is_empty() {
        return ChainDetectionResult {
            chains: vec![],
            parallel_groups: vec![],
            pagination_steps: vec![],
            execution_order: vec![],
        };
    }

    let ordered_steps = ordering::ordered_core_steps(&correlations[0], &core_indices[0]);
    let n = ordered_steps.len();
    let events: Vec<&flowtrace_types::NetworkEvent> = ordered_steps
        .iter()
        .map(|&i| &sessions[0].network_events[i])
        .collect();

    let mut pagination_steps: Vec<usize> = pagination::detect_pagination(&events).into_iter().collect();
    pagination_steps.sort_unstable();

    let mut candidates = vec![];
    for from in 0..n {
        for to in (from + 1)..n {
            let flows = dataflow::discover_pair(events[from], events[to]);
            if !flows.is_empty() {
                candidates.push((from, to, flows));
            }
        }
    }

    let chains = if candidates.is_empty() {
        vec![]
    } else {
        let request = ValidateChainsRequest {
            candidates: candidates
                .iter()
                .map(|(from, to, flows)| ChainCandidate {
                    from_step: *from as u32,
                    to_step: *to as u32,
                    from_description: describe(events[*from]),
                    to_description: describe(events[*to]),
                    data_flows: flows.clone(),
                })
                .collect(),
        };

        let mut chains = match gateway.validate_chains(request).await {
            Ok(response) => {
                let verdicts: HashMap<(u32, u32), _> =
                    response.results.into_iter().map(|r| ((r.from_step, r.to_step), r)).collect();
                candidates
                    .iter()
                    .filter_map(|(from, to, _)| {
                        let verdict = verdicts.get(&(*from as u32, *to as u32))?;
                        if !verdict.confirmed {
                            return None;
                        }
                        Some(Chain {
                            from_step: *from,
                            to_step: *to,
                            input_mappings: verdict.input_mappings.clone(),
                            is_parallel: verdict.is_parallel,
                            is_pagination: verdict.is_pagination,
                        })
                    })
                    .collect()
            }
            Err(err) => {
                tracing::warn!(error = %err, "chain validation failed, accepting all heuristic candidates");
                candidates
                    .iter()
                    .map(|(from, to, flows)| Chain {
                        from_step: *from,
                        to_step: *to,
                        input_mappings: flows
                            .iter()
                            .map(|f| StepInputMapping {
                                source_step: StepOrder::new(*from as u32),
                                source_json_path: f.source_json_path.clone(),
                                target_location: f.target_location,
                                target_key: f.target_key.clone(),
                                description: format!("{} into {}", f.source_json_path, f.target_key),
                            })
                            .collect(),
                        is_parallel: false,
                        is_pagination: false,
                    })
                    .collect()
            }
        };

        if sessions.len() > 1 {
            for chain in &mut chains {
                if chain.input_mappings.is_empty() {
                    continue;
                }
                let stable = stability::is_stable(
                    sessions,
                    correlations,
                    core_indices,
                    events[chain.from_step],
                    events[chain.to_step],
                    &chain.input_mappings,
                );
                if !stable {
                    tracing::debug!(
                        from = chain.from_step,
                        to = chain.to_step,
                        "chain data flow not stable across sessions, softening input mappings"
                    );
                    chain.input_mappings.clear();
                }
            }
        }
        chains
    };

    let edges: Vec<(usize, usize)> = chains.iter().filter(|c| !c.is_parallel).map(|c| (c.from_step, c.to_step)).collect();
    let execution_order = graph::topological_order(n, &edges);
    let parallel_groups = graph::parallel_groups(n, &edges);

    ChainDetectionResult {
        chains,
        parallel_groups,
        pagination_steps,
        execution_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flowtrace_gateway::mock::MockGateway;
    use flowtrace_gateway::schema::{ChainValidation, ValidateChainsResponse};
    use flowtrace_gateway::GatewayError;
    use flowtrace_types::{NetworkEvent, ParamLocation, SessionId};
    use std::collections::HashMap as StdHashMap;

    fn net(url: &str, response_body: Option<&str>) -> NetworkEvent {
        NetworkEvent {
            timestamp: 0,
            method: "GET".to_string(),
            url: url.to_string(),
            request_headers: StdHashMap::new(),
            request_body: None,
            response_status: 200,
            response_headers: StdHashMap::new(),
            response_body: response_body.map(str::to_string),
        }
    }

    fn session(events: Vec<NetworkEvent>) -> Session {
        Session {
            id: SessionId::new("s"),
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

    fn corr(dom: usize, net_idx: usize) -> Correlation {
        Correlation {
            dom_event_index: dom,
            network_event_indices: vec![net_idx],
            min_time_gap: 0,
        }
    }

    #[tokio::test]
    async fn llm_failure_accepts_heuristic_candidates() {
        let gateway = MockGateway::new();
        gateway.push_validate_chains(Err(GatewayError::Transient("boom".to_string())));

        let from = net("https://api.example.com/login", Some(r#"{"userId":"u-42"}"#));
        let to = net("https://api.example.com/users/u-42", None);
        let s = session(vec![from, to]);

        let result = detect(&gateway, &[s], &[vec![corr(0, 0), corr(1, 1)]], &[vec![0, 1]]).await;
        assert_eq!(result.chains.len(), 1);
        assert_eq!(result.chains[0].from_step, 0);
        assert_eq!(result.chains[0].to_step, 1);
        assert!(result.execution_order_is_permutation(2));
        assert!(result.chains_respect_ordering());
    }

    #[tokio::test]
    async fn unconfirmed_candidate_is_dropped() {
        let gateway = MockGateway::new();
        gateway.push_validate_chains(Ok(ValidateChainsResponse {
            results: vec![ChainValidation {
                from_step: 0,
                to_step: 1,
                confirmed: false,
                input_mappings: vec![],
                is_parallel: false,
                is_pagination: false,
            }],
        }));

        let from = net("https://api.example.com/login", Some(r#"{"userId":"u-42"}"#));
        let to = net("https://api.example.com/users/u-42", None);
        let s = session(vec![from, to]);

        let result = detect(&gateway, &[s], &[vec![corr(0, 0), corr(1, 1)]], &[vec![0, 1]]).await;
        assert!(result.chains.is_empty());
    }

    #[tokio::test]
    async fn pagination_steps_are_flagged_independent_of_chains() {
        let gateway = MockGateway::new();
        let e1 = net("https://api.example.com/items?page=1", None);
        let e2 = net("https://api.example.com/items?page=2", None);
        let s = session(vec![e1, e2]);

        let result = detect(&gateway, &[s], &[vec![corr(0, 0), corr(1, 1)]], &[vec![0, 1]]).await;
        assert_eq!(result.pagination_steps, vec![0, 1]);
    }

    #[tokio::test]
    async fn unstable_chain_has_mappings_softened() {
        let gateway = MockGateway::new();
        gateway.push_validate_chains(Ok(ValidateChainsResponse {
            results: vec![ChainValidation {
                from_step: 0,
                to_step: 1,
                confirmed: true,
                input_mappings: vec![StepInputMapping {
                    source_step: StepOrder::new(0),
                    source_json_path: "userId".to_string(),
                    target_location: ParamLocation::Path,
                    target_key: "segment_1".to_string(),
                    description: "user id".to_string(),
                }],
                is_parallel: false,
                is_pagination: false,
            }],
        }));

        let from1 = net("https://api.example.com/login", Some(r#"{"userId":"u-42"}"#));
        let to1 = net("https://api.example.com/users/u-42", None);
        let s1 = session(vec![from1, to1]);

        let from2 = net("https://api.example.com/login", Some(r#"{"userId":"u-99"}"#));
        let to2 = net("https://api.example.com/users/different", None);
        let s2 = session(vec![from2, to2]);

        let correlations = vec![vec![corr(0, 0), corr(1, 1)], vec![corr(0, 0), corr(1, 1)]];
        let core_indices = vec![vec![0, 1], vec![0, 1]];
        let result = detect(&gateway, &[s1, s2], &correlations, &core_indices).await;
        assert_eq!(result.chains.len(), 1);
        assert!(result.chains[0].input_mappings.is_empty());
    }
}

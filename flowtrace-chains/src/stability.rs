//! Cross-session stability check (spec.md §4.4, "Cross-session
//! stability"): a confirmed chain should reproduce in every other
//! session that contains the corresponding step pair.

use crate::dataflow::discover_pair;
use flowtrace_types::{Correlation, NetworkEvent, Session, StepInputMapping};

fn core_events_in_dom_order(correlations: &[Correlation], core_indices: &[usize]) -> Vec<usize> {
    let mut ordered: Vec<&Correlation> = correlations.iter().collect();
    ordered.sort_by_key(|c| c.dom_event_index);
    ordered
        .into_iter()
        .filter_map(|c| {
            c.network_event_indices
                .iter()
                .find(|i| core_indices.contains(i))
                .copied()
        })
        .collect()
}

fn find_matching_event<'a>(
    session: &'a Session,
    core_events: &[usize],
    method: &str,
    host_path: &str,
) -> Option<&'a NetworkEvent> {
    core_events.iter().map(|&i| &session.network_events[i]).find(|event| {
        event.method == method && event.host_path() == host_path
    })
}

/// Whether `mappings` reproduce in every other session that contains a
/// matching `(from, to)` step pair, by method + host-path.
pub fn is_stable(
    sessions: &[Session],
    correlations: &[Vec<Correlation>],
    core_indices: &[Vec<usize>],
    from_event: &NetworkEvent,
    to_event: &NetworkEvent,
    mappings: &[StepInputMapping],
) -> bool {
    if mappings.is_empty() {
        return true;
    }
    let from_method = from_event.method.clone();
    let from_host_path = from_event.host_path();
    let to_method = to_event.method.clone();
    let to_host_path = to_event.host_path();

    for session_idx in 1..sessions.len() {
        let session = &sessions[session_idx];
        let core_events = core_events_in_dom_order(&correlations[session_idx], &core_indices[session_idx]);
        let Some(from_match) = find_matching_event(session, &core_events, &from_method, &from_host_path) else {
            continue;
        };
        let Some(to_match) = find_matching_event(session, &core_events, &to_method, &to_host_path) else {
            continue;
        };

        let reproduced = discover_pair(from_match, to_match);
        let all_hold = mappings.iter().all(|m| {
            reproduced.iter().any(|flow| {
                flow.source_json_path == m.source_json_path
                    && flow.target_location == m.target_location
                    && flow.target_key == m.target_key
            })
        });
        if !all_hold {
            return false;
        }
    }
    true
}

//! Cross-session step matching (spec.md §4.3, "Step matching across
//! sessions"). Reference is always `sessions[0]`.

use flowtrace_types::{Correlation, NetworkEvent, Session};

/// One step in the reference session's ordered, correlated, core-only
/// event list.
#[derive(Debug, Clone)]
pub struct ReferenceStep {
    /// Position in the reference session's step list (0-based).
    pub ordinal: usize,
    /// Index into `sessions[0].dom_events`.
    pub dom_event_index: usize,
    /// Index into `sessions[0].network_events` for the step's request.
    pub network_event_index: usize,
}

/// Build the reference session's ordered core-step list: one entry per
/// correlation (already DOM-ordered) whose network events include at
/// least one core index, taking the lowest such index as the step's
/// representative request.
pub fn reference_steps(correlations: &[Correlation], core_indices: &[usize]) -> Vec<ReferenceStep> {
    let mut ordered: Vec<&Correlation> = correlations.iter().collect();
    ordered.sort_by_key(|c| c.dom_event_index);
    ordered
        .into_iter()
        .filter_map(|c| {
            c.network_event_indices
                .iter()
                .find(|i| core_indices.contains(i))
                .map(|&network_event_index| (c.dom_event_index, network_event_index))
        })
        .enumerate()
        .map(|(ordinal, (dom_event_index, network_event_index))| ReferenceStep {
            ordinal,
            dom_event_index,
            network_event_index,
        })
        .collect()
}

/// The same ordered core-step list for a non-reference session, used as
/// the match candidate pool.
fn session_core_events(correlations: &[Correlation], core_indices: &[usize]) -> Vec<usize> {
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

fn method_host_path(event: &NetworkEvent) -> (String, String) {
    (event.method.clone(), event.host_path())
}

/// For each reference step, find the matching network event in every
/// other session: same method + host-path, preferring the candidate at
/// the same ordinal position, otherwise the first unused candidate with
/// a matching method + host-path. Sessions with no match are simply
/// absent from the returned map for that step. A matched session's event
/// is consumed so it cannot also satisfy a later reference step.
pub fn match_steps(
    sessions: &[Session],
    correlations: &[Vec<Correlation>],
    core_indices: &[Vec<usize>],
) -> Vec<Vec<(usize, usize)>> {
    let Some(reference) = sessions.first() else {
        return vec![];
    };
    let ref_steps = reference_steps(&correlations[0], &core_indices[0]);

    let pools: Vec<Vec<usize>> = (1..sessions.len())
        .map(|i| session_core_events(&correlations[i], &core_indices[i]))
        .collect();
    let mut consumed: Vec<Vec<bool>> = pools.iter().map(|p| vec![false; p.len()]).collect();

    ref_steps
        .iter()
        .map(|step| {
            let ref_event = &reference.network_events[step.network_event_index];
            let (ref_method, ref_host_path) = method_host_path(ref_event);

            let mut matched = vec![(0usize, step.network_event_index)];
            for (pool_idx, session_idx) in (1..sessions.len()).enumerate() {
                let pool = &pools[pool_idx];
                let session = &sessions[session_idx];

                let same_ordinal = pool.get(step.ordinal).and_then(|&net_idx| {
                    let (m, hp) = method_host_path(&session.network_events[net_idx]);
                    if m == ref_method && hp == ref_host_path && !consumed[pool_idx][step.ordinal] {
                        Some((step.ordinal, net_idx))
                    } else {
                        None
                    }
                });

                let found = same_ordinal.or_else(|| {
                    pool.iter().enumerate().find_map(|(pos, &net_idx)| {
                        if consumed[pool_idx][pos] {
                            return None;
                        }
                        let (m, hp) = method_host_path(&session.network_events[net_idx]);
                        if m == ref_method && hp == ref_host_path {
                            Some((pos, net_idx))
                        } else {
                            None
                        }
                    })
                });

                if let Some((pos, net_idx)) = found {
                    consumed[pool_idx][pos] = true;
                    matched.push((session_idx, net_idx));
                }
            }
            matched
        })
        .collect()
}

//! Building the combined step list a workflow definition is ultimately
//! assembled from (spec.md §4.4, "Ordering"): one entry per correlated
//! core network event in the reference session, DOM-ordered.

use flowtrace_types::Correlation;

/// Network event indices (into the reference session's `network_events`),
/// one per step, in DOM order. The position in this list is the step's
/// order for the remainder of ChainDetector.
pub fn ordered_core_steps(correlations: &[Correlation], core_indices: &[usize]) -> Vec<usize> {
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

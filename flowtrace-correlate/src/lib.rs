#![deny(missing_docs)]
//! Stage 2 of the analysis pipeline: map each DOM event to the network
//! events it caused.

mod windowing;

pub use windowing::{
    assign_by_window, window_for, WINDOW_CAP_EXTRA_MS, WINDOW_CASCADE_MS, WINDOW_DEFAULT_MS,
};

use flowtrace_gateway::schema::{
    CorrelateValidateRequest, CorrelationCandidate, NetworkCandidate, ValidationConfidence,
};
use flowtrace_gateway::Gateway;
use flowtrace_types::{Correlation, DomEvent, NetworkEvent};
use std::collections::{HashMap, HashSet};

const BODY_PREVIEW_LEN: usize = 200;

/// Run Stage 2 over one session: temporal windowing and assignment, then
/// an LLM validation pass over each candidate correlation. Correlations
/// the LLM rates `low` confidence are dropped; `medium`/`high` are kept,
/// possibly narrowed to a subset of their network events. LLM failure
/// degrades to the unmodified temporal correlations (spec.md §4.2).
///
/// Output is sorted by `domEventIndex`.
pub async fn correlate(
    gateway: &dyn Gateway,
    dom_events: &[DomEvent],
    network_events: &[NetworkEvent],
    core_indices: &[usize],
    supporting_indices: &[usize],
) -> Vec<Correlation> {
    let considered: HashSet<usize> = core_indices
        .iter()
        .chain(supporting_indices.iter())
        .copied()
        .collect();
    let candidates: Vec<(usize, i64)> = considered
        .iter()
        .map(|&i| (i, network_events[i].timestamp))
        .collect();

    let assignment = assign_by_window(dom_events, &candidates);
    if assignment.is_empty() {
        return vec![];
    }

    let temporal: Vec<Correlation> = build_correlations(dom_events, network_events, &assignment);

    let request = CorrelateValidateRequest {
        candidates: temporal
            .iter()
            .map(|c| to_candidate(dom_events, network_events, c))
            .collect(),
    };

    match gateway.correlate_validate(request).await {
        Ok(response) => {
            let verdicts: HashMap<usize, (ValidationConfidence, Vec<usize>)> = response
                .results
                .into_iter()
                .map(|r| (r.dom_event_index, (r.confidence, r.kept_network_indices)))
                .collect();

            let mut validated: Vec<Correlation> = temporal
                .into_iter()
                .filter_map(|c| {
                    let Some((confidence, kept)) = verdicts.get(&c.dom_event_index) else {
                        return Some(c);
                    };
                    if *confidence == ValidationConfidence::Low {
                        return None;
                    }
                    let mut kept = kept.clone();
                    kept.sort_unstable();
                    if kept.is_empty() {
                        return None;
                    }
                    let dom_ts = dom_events[c.dom_event_index].timestamp;
                    let pairs: Vec<(usize, i64)> = kept
                        .iter()
                        .map(|&i| (i, network_events[i].timestamp))
                        .collect();
                    Some(Correlation::new(c.dom_event_index, dom_ts, &pairs))
                })
                .collect();
            validated.sort_by_key(|c| c.dom_event_index);
            validated
        }
        Err(err) => {
            tracing::warn!(error = %err, "correlation validation failed, keeping temporal correlations");
            temporal
        }
    }
}

fn build_correlations(
    dom_events: &[DomEvent],
    network_events: &[NetworkEvent],
    assignment: &HashMap<usize, Vec<usize>>,
) -> Vec<Correlation> {
    let mut correlations: Vec<Correlation> = assignment
        .iter()
        .map(|(&dom_index, net_indices)| {
            let dom_ts = dom_events[dom_index].timestamp;
            let pairs: Vec<(usize, i64)> = net_indices
                .iter()
                .map(|&i| (i, network_events[i].timestamp))
                .collect();
            Correlation::new(dom_index, dom_ts, &pairs)
        })
        .collect();
    correlations.sort_by_key(|c| c.dom_event_index);
    correlations
}

fn to_candidate(
    dom_events: &[DomEvent],
    network_events: &[NetworkEvent],
    correlation: &Correlation,
) -> CorrelationCandidate {
    let dom = &dom_events[correlation.dom_event_index];
    CorrelationCandidate {
        dom_event_index: correlation.dom_event_index,
        selector: dom.primary_selector.clone(),
        aria_label: dom.element.aria_label.clone(),
        value: dom.value.clone(),
        candidates: correlation
            .network_event_indices
            .iter()
            .map(|&i| {
                let event = &network_events[i];
                NetworkCandidate {
                    index: i,
                    method: event.method.clone(),
                    url: event.url.clone(),
                    body_preview: event
                        .request_body
                        .as_deref()
                        .map(|b| b.chars().take(BODY_PREVIEW_LEN).collect()),
                }
            })
            .collect(),
    }
}

//! Temporal windowing and assignment: the purely heuristic half of
//! correlation (spec.md §4.2, "Windowing" and "Assignment"). Never fails.

use flowtrace_types::DomEvent;
use std::collections::HashMap;

/// Window width for DOM events that don't trigger a cascade.
pub const WINDOW_DEFAULT_MS: i64 = 2000;
/// Window width for `navigate`/`submit`, which legitimately trigger a
/// delayed cascade of follow-up requests.
pub const WINDOW_CASCADE_MS: i64 = 5000;
/// The window's upper bound is capped at `nextDomEvent.timestamp + CAP_MS`
/// to prevent cross-event bleed.
pub const WINDOW_CAP_EXTRA_MS: i64 = 500;

/// The `[start, end)` correlation window for the DOM event at `index`.
pub fn window_for(dom_events: &[DomEvent], index: usize) -> (i64, i64) {
    let event = &dom_events[index];
    let width = if event.kind.triggers_cascade() {
        WINDOW_CASCADE_MS
    } else {
        WINDOW_DEFAULT_MS
    };
    let mut end = event.timestamp + width;
    if let Some(next) = dom_events.get(index + 1) {
        end = end.min(next.timestamp + WINDOW_CAP_EXTRA_MS);
    }
    (event.timestamp, end)
}

/// Assign each candidate network event (by index, with its timestamp) to
/// at most one DOM event, by nearest window start, ties broken by DOM
/// order. Returns a map from DOM event index to the network indices
/// assigned to it, in ascending network-index order.
pub fn assign_by_window(
    dom_events: &[DomEvent],
    candidates: &[(usize, i64)],
) -> HashMap<usize, Vec<usize>> {
    let windows: Vec<(i64, i64)> = (0..dom_events.len())
        .map(|i| window_for(dom_events, i))
        .collect();

    let mut assignment: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(net_index, net_ts) in candidates {
        let mut best: Option<(usize, i64)> = None;
        for (dom_index, &(start, end)) in windows.iter().enumerate() {
            if net_ts >= start && net_ts < end {
                let distance = (net_ts - start).abs();
                best = match best {
                    None => Some((dom_index, distance)),
                    Some((_, best_distance)) if distance < best_distance => {
                        Some((dom_index, distance))
                    }
                    other => other,
                };
            }
        }
        if let Some((dom_index, _)) = best {
            assignment.entry(dom_index).or_default().push(net_index);
        }
    }
    for indices in assignment.values_mut() {
        indices.sort_unstable();
    }
    assignment
}

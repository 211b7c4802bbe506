//! A recording of one contiguous browser-tab session, and the DOM→network
//! correlations Stage 2 computes over it.

use crate::event::{DomEvent, NetworkEvent};
use crate::id::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One contiguous recording of user interactions and network traffic on a
/// single page. Produced by the (out-of-scope) recorder, persisted once,
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier.
    pub id: SessionId,
    /// The workflow this recording belongs to.
    pub workflow_name: String,
    /// The URL the tab was on when recording started.
    pub url: String,
    /// Recording start, monotonic ms.
    pub started_at: i64,
    /// Recording end, monotonic ms.
    pub ended_at: i64,
    /// Recorded at (wall clock), used for `lastRecorded` and newest-first
    /// repository ordering.
    pub recorded_at: DateTime<Utc>,
    /// DOM interactions, in timestamp order.
    pub dom_events: Vec<DomEvent>,
    /// Network exchanges, in timestamp order.
    pub network_events: Vec<NetworkEvent>,
    /// Correlations computed by Stage 2, if this session has been analyzed.
    pub correlations: Option<Vec<Correlation>>,
}

impl Session {
    /// Whether the session's event streams are in non-decreasing timestamp
    /// order, per spec.md §5's ordering guarantee.
    pub fn events_are_time_ordered(&self) -> bool {
        self.dom_events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
            && self
                .network_events
                .windows(2)
                .all(|w| w[0].timestamp <= w[1].timestamp)
    }
}

/// A mapping from one DOM event to the network events it caused, produced
/// by the Correlator (Stage 2). Indices are global within the owning
/// session's event vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// Index into `Session::dom_events`.
    pub dom_event_index: usize,
    /// Indices into `Session::network_events`, sorted ascending.
    pub network_event_indices: Vec<usize>,
    /// The minimum time gap (ms) among the correlation's network events,
    /// i.e. `min(network_events[i].timestamp - dom_events[dom_event_index].timestamp)`.
    pub min_time_gap: i64,
}

impl Correlation {
    /// Build a correlation, computing `min_time_gap` from the given events.
    pub fn new(dom_event_index: usize, dom_ts: i64, network: &[(usize, i64)]) -> Self {
        let mut indices: Vec<usize> = network.iter().map(|(idx, _)| *idx).collect();
        indices.sort_unstable();
        let min_gap = network
            .iter()
            .map(|(_, ts)| (ts - dom_ts).abs())
            .min()
            .unwrap_or(0);
        Self {
            dom_event_index,
            network_event_indices: indices,
            min_time_gap: min_gap,
        }
    }
}

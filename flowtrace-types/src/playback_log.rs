//! Records of `IntelligentPlayback` runs, used to build per-site insights
//! for future generative-mode replays (spec.md §4.7).

use crate::id::WorkflowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a playback run ended.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The goal was reached.
    Success,
    /// `MAX_ACTIONS` or `MAX_RETRIES` was exhausted without reaching the goal.
    Exhausted,
    /// The driver or gateway returned a terminal error.
    Failed,
    /// The run was cancelled before completion.
    Cancelled,
}

/// One action the loop actually took, independent of which mode chose it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedAction {
    /// 0-based position within the run.
    pub index: u32,
    /// Short description of the action (e.g. `"click #submit"`).
    pub description: String,
    /// Whether the action succeeded against the live page.
    pub succeeded: bool,
    /// The site-pattern-scoped selector or workflow step this action came
    /// from, if it was sourced from a known definition rather than decided
    /// ad hoc by the gateway.
    pub source_step: Option<u32>,
}

/// A single `IntelligentPlayback` run, persisted for insight-mining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackLogEntry {
    /// The workflow this run attempted to replay, if known in advance
    /// (absent in pure generative mode with no matching definition).
    pub workflow_id: Option<WorkflowId>,
    /// A normalized site pattern (e.g. `checkout.example.com/cart`) used to
    /// group insights across unrelated workflow names.
    pub site_pattern: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// How it ended.
    pub outcome: Outcome,
    /// The actions actually taken, in order.
    pub actions: Vec<CompletedAction>,
    /// Number of decision-gateway retries consumed.
    pub retries_used: u32,
    /// Free-form note the gateway produced at the end of the run (e.g. "form
    /// validation blocked submit"), used to seed future insight summaries.
    pub summary: Option<String>,
}

impl PlaybackLogEntry {
    /// Whether `actions` is consistent with the recorded outcome: a
    /// `Success` entry has at least one action and its last action
    /// succeeded; other outcomes place no constraint.
    pub fn is_internally_consistent(&self) -> bool {
        if self.outcome != Outcome::Success {
            return true;
        }
        matches!(self.actions.last(), Some(a) if a.succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(outcome: Outcome, actions: Vec<CompletedAction>) -> PlaybackLogEntry {
        PlaybackLogEntry {
            workflow_id: None,
            site_pattern: "example.com".into(),
            started_at: Utc::now(),
            outcome,
            actions,
            retries_used: 0,
            summary: None,
        }
    }

    fn action(succeeded: bool) -> CompletedAction {
        CompletedAction {
            index: 0,
            description: "click".into(),
            succeeded,
            source_step: None,
        }
    }

    #[test]
    fn success_with_failed_last_action_is_inconsistent() {
        let e = entry(Outcome::Success, vec![action(true), action(false)]);
        assert!(!e.is_internally_consistent());
    }

    #[test]
    fn success_with_succeeding_last_action_is_consistent() {
        let e = entry(Outcome::Success, vec![action(false), action(true)]);
        assert!(e.is_internally_consistent());
    }

    #[test]
    fn exhausted_with_no_actions_is_consistent() {
        let e = entry(Outcome::Exhausted, vec![]);
        assert!(e.is_internally_consistent());
    }
}

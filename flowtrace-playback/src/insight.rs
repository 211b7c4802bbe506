//! Builds the free-text insight a playback run leaves behind for future
//! runs against the same site pattern (spec.md §4.7 "Insight construction").

use flowtrace_types::{CompletedAction, Outcome};
use std::collections::BTreeMap;

const MAX_ERROR_REASONS: usize = 3;

fn outcome_word(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Success => "succeeded",
        Outcome::Exhausted => "exhausted its action budget",
        Outcome::Failed => "failed",
        Outcome::Cancelled => "was cancelled",
    }
}

/// Compose the `summary` stored on a [`flowtrace_types::PlaybackLogEntry`]:
/// an outcome-prefixed sentence, a count of successful actions by kind, and
/// up to [`MAX_ERROR_REASONS`] distinct error reasons.
pub fn build_summary(outcome: Outcome, completed: &[CompletedAction], error_reasons: &[String]) -> String {
    let mut succeeded_by_kind: BTreeMap<&str, u32> = BTreeMap::new();
    for action in completed.iter().filter(|a| a.succeeded) {
        let kind = action.description.split_whitespace().next().unwrap_or("action");
        *succeeded_by_kind.entry(kind).or_insert(0) += 1;
    }

    let mut parts = vec![format!("Run {} after {} action(s).", outcome_word(outcome), completed.len())];

    if !succeeded_by_kind.is_empty() {
        let counts: Vec<String> = succeeded_by_kind.iter().map(|(kind, n)| format!("{n} {kind}")).collect();
        parts.push(format!("Succeeded: {}.", counts.join(", ")));
    }

    let mut seen = Vec::new();
    for reason in error_reasons {
        if seen.len() >= MAX_ERROR_REASONS {
            break;
        }
        if !seen.contains(reason) {
            seen.push(reason.clone());
        }
    }
    if !seen.is_empty() {
        parts.push(format!("Errors seen: {}.", seen.join("; ")));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(description: &str, succeeded: bool) -> CompletedAction {
        CompletedAction {
            index: 0,
            description: description.to_string(),
            succeeded,
            source_step: None,
        }
    }

    #[test]
    fn success_counts_are_grouped_by_kind() {
        let completed = vec![
            action("click #submit", true),
            action("click #next", true),
            action("input #email", true),
        ];
        let summary = build_summary(Outcome::Success, &completed, &[]);
        assert!(summary.contains("succeeded"));
        assert!(summary.contains("2 click"));
        assert!(summary.contains("1 input"));
    }

    #[test]
    fn error_reasons_are_deduped_and_capped() {
        let reasons = vec![
            "element not found".to_string(),
            "element not found".to_string(),
            "timeout".to_string(),
            "modal blocked click".to_string(),
            "network error".to_string(),
        ];
        let summary = build_summary(Outcome::Failed, &[], &reasons);
        assert!(summary.contains("element not found"));
        assert!(summary.contains("timeout"));
        assert!(summary.contains("modal blocked click"));
        assert!(!summary.contains("network error"));
    }
}

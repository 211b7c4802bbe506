//! `WorkflowDefinition` — the artifact the analysis pipeline produces.

use crate::auth::AuthPattern;
use crate::parameter::{ParamType, ParameterDef};
use crate::step::WorkflowStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much to trust a `WorkflowDefinition`, derived deterministically from
/// recording count, chain validation, and parameter count (spec.md §4.6
/// "Confidence").
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Total score ≥ 5.
    High,
    /// Total score ≥ 3.
    Medium,
    /// Total score < 3.
    Low,
}

impl Confidence {
    /// Compute confidence from the inputs spec.md §3 Invariant 6 names:
    /// recording count, whether any chain was validated, and parameter
    /// count. Deterministic — identical inputs yield identical confidence.
    pub fn score(recording_count: usize, any_chain_validated: bool, parameter_count: usize) -> Self {
        let mut total = match recording_count {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 3,
        };
        if any_chain_validated {
            total += 2;
        }
        if parameter_count > 0 {
            total += 1;
        }
        if total >= 5 {
            Confidence::High
        } else if total >= 3 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// One field the workflow's final response is expected to contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnField {
    /// Field name.
    pub name: String,
    /// Inferred type.
    #[serde(rename = "type")]
    pub field_type: ParamType,
    /// Human-readable description.
    pub description: String,
    /// Which step and JSON path this value is sourced from.
    pub source: ReturnSource,
}

/// Where a `ReturnField`'s value comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSource {
    /// The step whose response contains this value.
    pub step: crate::id::StepOrder,
    /// Dotted JSON path into that step's response body.
    pub json_path: String,
}

/// A summary of what the workflow as a whole returns to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Returns {
    /// Human-readable summary, LLM-authored or mechanically derived.
    pub description: String,
    /// The fields the caller can expect back.
    pub fields: Vec<ReturnField>,
}

/// The artifact the analysis pipeline (`flowtrace-pipeline`) produces: a
/// structured, parameterized, partially-ordered sequence of steps that can
/// later be replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// The workflow's name (matches `Session::workflow_name` across inputs).
    pub name: String,
    /// Human-readable summary of what the workflow does.
    pub description: String,
    /// How much to trust this definition.
    pub confidence: Confidence,
    /// The steps, in dense 0-based order.
    pub steps: Vec<WorkflowStep>,
    /// User-supplied inputs identified by cross-session diffing.
    pub parameters: Vec<ParameterDef>,
    /// What the workflow returns overall.
    pub returns: Returns,
    /// Inferred authentication scheme and credential slots.
    pub auth: AuthPattern,
    /// `protocol://host` of the first network event.
    pub base_url: String,
    /// How many sessions contributed to this definition.
    pub recording_count: usize,
    /// The maximum `endedAt` (as wall-clock ISO-8601) across input sessions.
    pub last_recorded: DateTime<Utc>,
}

impl WorkflowDefinition {
    /// `steps[i].order == i` and `steps` is sorted accordingly — spec.md §8
    /// "ordering" property.
    pub fn steps_are_densely_ordered(&self) -> bool {
        self.steps
            .iter()
            .enumerate()
            .all(|(i, s)| s.order.index() as usize == i)
    }

    /// Every `ParameterDef.usedIn[*]` references an existing step order —
    /// spec.md §8 "parameter coverage" property.
    pub fn parameters_reference_existing_steps(&self) -> bool {
        self.parameters
            .iter()
            .all(|p| p.usages_reference_existing_steps(self.steps.len()))
    }

    /// Every step's `inputMappings[*].sourceStep` is strictly less than the
    /// step it belongs to — spec.md §8 "chain acyclicity" property.
    pub fn chains_are_acyclic(&self) -> bool {
        self.steps.iter().all(|s| s.input_mappings_respect_order())
    }
}

//! `WorkflowStep` and its constituent parts.

use crate::event::DomEventKind;
use crate::id::StepOrder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A DOM interaction captured as part of a step's replay recipe. Fallback
/// selectors are heuristic hints for deterministic replay (out of scope) —
/// the intelligent-playback loop never consults them (spec.md §9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomAction {
    /// The kind of interaction to replay.
    pub kind: DomEventKind,
    /// Primary selector.
    pub selector: String,
    /// Fallback selectors in priority order: `[aria-label]`, `:contains()`,
    /// `[data-testid]`, `[name]`, `#id`.
    #[serde(default)]
    pub fallback_selectors: Vec<String>,
    /// `aria-label` of the target element, if any.
    pub aria_label: Option<String>,
    /// Truncated visible text (≤100 chars).
    pub text_content: Option<String>,
    /// The literal or templated value entered.
    pub value: Option<String>,
    /// The parameter this action's value is driven by, if any.
    pub parameter_ref: Option<String>,
}

/// The templated HTTP request a step issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTemplate {
    /// HTTP method.
    pub method: String,
    /// URL path with `{paramName}` placeholders substituted for example
    /// values, e.g. `/api/orders/{orderId}`.
    pub path_template: String,
    /// Query parameters, keys mapped to literal or `{paramName}` values.
    #[serde(default)]
    pub query_template: HashMap<String, String>,
    /// Cleaned request headers (transport/browser headers removed),
    /// parameter placeholders substituted where applicable.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// JSON body as a string with `{paramName}` placeholders substituted,
    /// if the step sends a body.
    pub body_template: Option<String>,
}

/// Data flowing from a prior step's response into this step's request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInputMapping {
    /// The step whose response this value was extracted from. Always
    /// strictly less than the owning step's order (spec.md §3 Invariant 2).
    pub source_step: StepOrder,
    /// Dotted JSON path into the source step's response body.
    pub source_json_path: String,
    /// Where in this step's request the value is substituted.
    pub target_location: crate::parameter::ParamLocation,
    /// The key at that location.
    pub target_key: String,
    /// Human-readable description.
    pub description: String,
}

/// Something worth extracting from a step's response, for use by later
/// steps or as part of the workflow's overall `returns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExtraction {
    /// A short name for the extracted value.
    pub name: String,
    /// Dotted JSON path into the response body.
    pub json_path: String,
    /// Inferred type.
    #[serde(rename = "type")]
    pub field_type: crate::parameter::ParamType,
    /// Human-readable description.
    pub description: String,
}

/// What terminates a repeat-until loop step.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoopCondition {
    /// Stop once a selector no longer matches any element.
    ElementAbsent {
        /// The selector to check.
        selector: String,
    },
    /// Stop once a selector matches an element.
    ElementPresent {
        /// The selector to check.
        selector: String,
    },
    /// Stop once a response JSON path equals an expected value.
    ApiResponseMatch {
        /// Dotted JSON path into the response body.
        json_path: String,
        /// The value that signals completion.
        expected_value: String,
    },
}

/// Expectations about a step's HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// The status code observed during recording.
    pub expected_status: u16,
    /// Fields worth extracting from the response body.
    #[serde(default)]
    pub extract_fields: Vec<FieldExtraction>,
}

/// One unit of a workflow: a DOM action, a request template, an expected
/// response, and any input mappings or dependencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// 0-based, dense position within the workflow.
    pub order: StepOrder,
    /// Human-readable description composed from the DOM action and the
    /// request line.
    pub description: String,
    /// The user interaction that triggers this step, if replay is
    /// browser-driven (absent for pure-API steps).
    pub dom_action: Option<DomAction>,
    /// The HTTP request this step issues.
    pub request: RequestTemplate,
    /// Data flowing in from earlier steps.
    #[serde(default)]
    pub input_mappings: Vec<StepInputMapping>,
    /// Response expectations.
    pub response: ResponseSpec,
    /// A step this one depends on beyond what `input_mappings` implies
    /// (e.g. ordering-only dependencies with no data flow).
    pub depends_on: Option<StepOrder>,
    /// Whether this step is part of a pagination loop.
    pub is_loop_step: bool,
    /// Termination condition, set iff `is_loop_step`.
    pub loop_condition: Option<LoopCondition>,
    /// Whether executing this step's DOM action opens a popup window.
    pub opens_popup: bool,
    /// Nested actions to perform inside the popup, if any.
    #[serde(default)]
    pub popup_actions: Vec<DomAction>,
}

impl WorkflowStep {
    /// Every `inputMapping.sourceStep` is strictly less than this step's
    /// order (spec.md §3 Invariant 2, §8 "chain acyclicity").
    pub fn input_mappings_respect_order(&self) -> bool {
        self.input_mappings
            .iter()
            .all(|m| m.source_step < self.order)
    }
}

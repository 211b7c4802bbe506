//! Typed request/response pairs for the eight gateway functions named in
//! spec.md §6: classify, correlate-validate, parameterize, validate-chains,
//! detect-auth, workflow-metadata, next-action, intent.
//!
//! Each response type is the exact JSON schema the gateway declares for
//! that function; [`crate::Gateway`] methods parse straight into these.

use flowtrace_types::{AuthPattern, ParamLocation, ParameterDef, ReturnField, StepInputMapping};
use serde::{Deserialize, Serialize};

// -- classify --

/// A heuristic-pass survivor, summarized for the classification prompt.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    /// Index into the session's network events.
    pub index: usize,
    /// HTTP method.
    pub method: String,
    /// Request URL.
    pub url: String,
    /// Response status.
    pub status: u16,
    /// Request + response header names (values never sent to the model).
    pub header_names: Vec<String>,
    /// Truncated request/response body preview.
    pub body_preview: Option<String>,
}

/// One DOM event, summarized for context in the classification prompt.
#[derive(Debug, Clone, Serialize)]
pub struct DomEventSummary {
    /// Millisecond timestamp.
    pub timestamp: i64,
    /// Event kind as a string (`"click"`, `"submit"`, ...).
    pub kind: String,
    /// Primary selector.
    pub selector: String,
}

/// Request to `classify`.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest {
    /// Heuristic-pass survivors to classify.
    pub events: Vec<EventSummary>,
    /// The session's full DOM-event stream, for context.
    pub dom_context: Vec<DomEventSummary>,
}

/// The three-way classification a network event can receive.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseClass {
    /// Directly realizes the user's intent.
    Core,
    /// Auth/session infrastructure that must be preserved.
    Supporting,
    /// Unrelated.
    Noise,
}

/// One classified event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventClassification {
    /// Index this classification applies to.
    pub index: usize,
    /// The assigned class.
    pub class: NoiseClass,
}

/// Response from `classify`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyResponse {
    /// One entry per event the model chose to classify. Per spec.md §4.1,
    /// any survivor absent from this list defaults to `supporting`.
    pub classifications: Vec<EventClassification>,
}

// -- correlate-validate --

/// A network event candidate for a DOM event's correlation window.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkCandidate {
    /// Index into the session's network events.
    pub index: usize,
    /// HTTP method.
    pub method: String,
    /// Request URL.
    pub url: String,
    /// Truncated request body preview, if any.
    pub body_preview: Option<String>,
}

/// A temporally-assigned DOM event + candidate network events, awaiting
/// semantic validation.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationCandidate {
    /// Index of the DOM event.
    pub dom_event_index: usize,
    /// The DOM event's selector.
    pub selector: String,
    /// `aria-label`, if any.
    pub aria_label: Option<String>,
    /// Entered value, if any (already redacted upstream if sensitive).
    pub value: Option<String>,
    /// Candidate network events temporally assigned to this DOM event.
    pub candidates: Vec<NetworkCandidate>,
}

/// Request to `correlate-validate`.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelateValidateRequest {
    /// Temporal candidates to validate.
    pub candidates: Vec<CorrelationCandidate>,
}

/// Confidence the gateway assigns a validated correlation or chain.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationConfidence {
    /// Dropped — spec.md §4.2 discards `low` confidence correlations.
    Low,
    /// Kept.
    Medium,
    /// Kept.
    High,
}

/// One validated (or rejected) correlation.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationValidation {
    /// The DOM event this validation concerns.
    pub dom_event_index: usize,
    /// The model's confidence.
    pub confidence: ValidationConfidence,
    /// The subset of candidate network-event indices confirmed as caused
    /// by this DOM event.
    pub kept_network_indices: Vec<usize>,
}

/// Response from `correlate-validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrelateValidateResponse {
    /// One entry per submitted candidate.
    pub results: Vec<CorrelationValidation>,
}

// -- parameterize --

/// One location + key where a varying part was observed for a step.
#[derive(Debug, Clone, Serialize)]
pub struct VaryingPart {
    /// The step this varying part belongs to.
    pub step_order: u32,
    /// Where it appears.
    pub location: ParamLocation,
    /// The key at that location (`segment_i`, query key, dotted JSON path,
    /// or header name).
    pub key: String,
    /// Distinct observed values across sessions. Sensitive header values
    /// arrive already redacted by the caller (`flowtrace-parameterize`).
    pub observed_values: Vec<String>,
}

/// Request to `parameterize`.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterizeRequest {
    /// The full aggregated diff across matched steps.
    pub varying_parts: Vec<VaryingPart>,
    /// DOM event context per step, for naming hints.
    pub dom_context: Vec<DomEventSummary>,
}

/// Response from `parameterize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterizeResponse {
    /// Named, typed parameters, with `usedIn` entries merged across
    /// locations that represent the same semantic input.
    pub parameters: Vec<ParameterDef>,
}

// -- validate-chains --

/// A candidate data-flow occurrence discovered by flattening a response
/// body and matching against a later request.
#[derive(Debug, Clone, Serialize)]
pub struct DataFlowCandidate {
    /// Dotted JSON path in `from`'s response body.
    pub source_json_path: String,
    /// Where it was found in `to`'s request.
    pub target_location: ParamLocation,
    /// The key at that location.
    pub target_key: String,
}

/// A candidate chain edge awaiting semantic validation.
#[derive(Debug, Clone, Serialize)]
pub struct ChainCandidate {
    /// The earlier step.
    pub from_step: u32,
    /// The later step.
    pub to_step: u32,
    /// Short description of `from_step`.
    pub from_description: String,
    /// Short description of `to_step`.
    pub to_description: String,
    /// Discovered data-flow occurrences.
    pub data_flows: Vec<DataFlowCandidate>,
}

/// Request to `validate-chains`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateChainsRequest {
    /// Candidates discovered heuristically.
    pub candidates: Vec<ChainCandidate>,
}

/// One chain candidate's verdict.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainValidation {
    /// The earlier step.
    pub from_step: u32,
    /// The later step.
    pub to_step: u32,
    /// Whether the chain is real.
    pub confirmed: bool,
    /// Refined input mappings, if confirmed.
    #[serde(default)]
    pub input_mappings: Vec<StepInputMapping>,
    /// True if the two steps have no real dependency despite the
    /// coincidental data-flow match.
    pub is_parallel: bool,
    /// True if this edge is better explained as pagination.
    pub is_pagination: bool,
}

/// Response from `validate-chains`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateChainsResponse {
    /// One entry per submitted candidate.
    pub results: Vec<ChainValidation>,
}

// -- detect-auth --

/// One tallied, redacted credential observation across sessions.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialObservation {
    /// Header, cookie, or query-parameter name.
    pub name: String,
    /// Where it was observed.
    pub location: flowtrace_types::CredentialLocation,
    /// Whether it was observed consistently in every session.
    pub consistent: bool,
    /// A length placeholder in place of the actual value (e.g. `"32 chars"`)
    /// except for query parameters, which may be sent verbatim per
    /// spec.md §4.5 ("their presence is already suspicious").
    pub value_hint: String,
}

/// Request to `detect-auth`.
#[derive(Debug, Clone, Serialize)]
pub struct DetectAuthRequest {
    /// The heuristic classification already reached.
    pub heuristic_pattern: AuthPattern,
    /// Redacted supporting observations, for better field naming.
    pub observations: Vec<CredentialObservation>,
}

/// Response from `detect-auth`.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectAuthResponse {
    /// The refined pattern. Never contains a credential value.
    pub pattern: AuthPattern,
}

// -- workflow-metadata --

/// Per-step summary used to author workflow-level metadata.
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    /// 0-based order.
    pub order: u32,
    /// Short description.
    pub description: String,
    /// Fields extracted from this step's response, if any.
    pub extracted_fields: Vec<String>,
}

/// Request to `workflow-metadata`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowMetadataRequest {
    /// Every step in the assembled workflow.
    pub steps: Vec<StepSummary>,
    /// Parameter names already identified.
    pub parameter_names: Vec<String>,
}

/// Response from `workflow-metadata`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowMetadataResponse {
    /// The workflow's description.
    pub description: String,
    /// Summary of what the workflow returns.
    pub returns_description: String,
    /// Fields the workflow returns.
    pub returns_fields: Vec<ReturnField>,
}

// -- next-action (playback) --

/// One interactive element from a page snapshot, as seen by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct InteractiveElementSummary {
    /// The snapshot-local index the gateway must reference in its action.
    pub index: u32,
    /// HTML tag name.
    pub tag: String,
    /// Input `type`, if applicable.
    pub element_type: Option<String>,
    /// `aria-label`, if any.
    pub aria_label: Option<String>,
    /// Visible text content.
    pub text_content: Option<String>,
    /// Placeholder text, if any.
    pub placeholder: Option<String>,
    /// `disabled` flag.
    pub disabled: bool,
}

/// Playback mode for the current iteration (spec.md §4.7 "Mode selection").
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// A defined step exists at the current index.
    Guided,
    /// No more defined steps; the gateway must improvise.
    Generative,
    /// The previous action failed.
    Recovery,
}

/// Context threaded into every `next-action` and `intent` call.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackContext {
    /// The workflow's plain-language goal.
    pub intent: String,
    /// What this step is meant to accomplish, if guided.
    pub step_intent: Option<String>,
    /// Current step index.
    pub step_index: u32,
    /// Total defined steps.
    pub total_steps: u32,
    /// Short descriptions of actions already completed this run.
    pub completed: Vec<String>,
    /// Known parameter names and example values.
    pub params: Vec<(String, String)>,
    /// Descriptions of the steps the workflow definition already knows.
    pub defined_steps: Vec<String>,
    /// The most recent action failure's reason, if any.
    pub last_error: Option<String>,
    /// Past-run insight summaries for this site pattern, newest first.
    pub insights: Vec<String>,
}

/// The kind of action the decision gateway can choose.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Click an element.
    Click,
    /// Type a value into an element.
    Input,
    /// Choose a value from a `<select>`.
    Select,
    /// Dispatch a keyboard event on an element.
    Keydown,
    /// Navigate to a URL.
    Navigate,
    /// Wait without acting.
    Wait,
    /// Scroll the page.
    Scroll,
    /// The workflow is complete.
    Done,
    /// The workflow cannot proceed.
    Fail,
}

/// One action the decision gateway chose.
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    /// What kind of action this is.
    pub kind: ActionKind,
    /// Index into the snapshot's interactive elements, required for
    /// `click`/`input`/`select`/`keydown`.
    pub element_index: Option<u32>,
    /// Value to type/select, or the URL to navigate to.
    pub value: Option<String>,
    /// Key to dispatch, for `keydown`.
    pub key: Option<String>,
    /// Why the gateway chose this action.
    pub reasoning: String,
    /// Self-reported confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Request to `next-action`. The screenshot travels as base64-encoded PNG
/// bytes in the multimodal prompt; it is not part of the JSON schema the
/// response must match.
#[derive(Debug, Clone, Serialize)]
pub struct NextActionRequest {
    /// Current page URL.
    pub url: String,
    /// Current page title.
    pub title: String,
    /// The page's interactive elements.
    pub elements: Vec<InteractiveElementSummary>,
    /// Whether a modal is currently open.
    pub modal_open: bool,
    /// Shared playback context.
    pub context: PlaybackContext,
    /// The selected mode for this iteration.
    pub mode: PlaybackMode,
}

/// Response from `next-action`.
#[derive(Debug, Clone, Deserialize)]
pub struct NextActionResponse {
    /// The chosen action.
    pub action: Action,
    /// Whether completing this action should advance `stepIndex`.
    pub step_advanced: bool,
    /// Whether the workflow is now complete.
    pub workflow_complete: bool,
}

// -- intent --

/// Request to `intent`/`summarize`: produce a plain-language goal summary
/// once per playback run.
#[derive(Debug, Clone, Serialize)]
pub struct IntentRequest {
    /// The workflow's name.
    pub workflow_name: String,
    /// The workflow's mechanically-composed step descriptions.
    pub step_descriptions: Vec<String>,
    /// Known parameter names and example values.
    pub params: Vec<(String, String)>,
}

/// Response from `intent`.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentResponse {
    /// A plain-language summary of the workflow's goal.
    pub intent: String,
}

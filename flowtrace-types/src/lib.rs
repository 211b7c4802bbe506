//! Shared data model for the flowtrace workflow-synthesis core.
//!
//! Every stage of the analysis pipeline (`flowtrace-noise`,
//! `flowtrace-correlate`, `flowtrace-parameterize`, `flowtrace-chains`,
//! `flowtrace-auth`, `flowtrace-assemble`) and the playback loop
//! (`flowtrace-playback`) builds on the types defined here. Nothing in this
//! crate talks to an LLM gateway, a repository, or a browser — it is pure
//! data plus the structural invariants those consumers rely on.

pub mod auth;
pub mod definition;
pub mod event;
pub mod flatten;
pub mod id;
pub mod parameter;
pub mod playback_log;
pub mod redact;
pub mod session;
pub mod step;

pub use auth::{AuthKind, AuthPattern, CredentialField, CredentialLocation};
pub use definition::{Confidence, ReturnField, ReturnSource, Returns, WorkflowDefinition};
pub use event::{DomEvent, DomEventKind, ElementDescriptor, NetworkEvent};
pub use flatten::{flatten_json, flatten_json_capped};
pub use id::{SessionId, StepOrder, WorkflowId};
pub use parameter::{ParamLocation, ParamType, ParamUsage, ParameterDef};
pub use playback_log::{CompletedAction, Outcome, PlaybackLogEntry};
pub use redact::{is_sensitive_header, redact_headers, redact_value, SENSITIVE_HEADERS};
pub use session::{Correlation, Session};
pub use step::{
    DomAction, FieldExtraction, LoopCondition, RequestTemplate, ResponseSpec, StepInputMapping,
    WorkflowStep,
};

//! Errors from running the full analysis pipeline.

use flowtrace_repository::RepositoryError;
use thiserror::Error;

/// Errors from [`crate::run`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No sessions are recorded for the requested workflow name.
    #[error("no sessions recorded for workflow \"{0}\"")]
    NoSessions(String),

    /// The pipeline was cancelled before completing. No partial
    /// `WorkflowDefinition` is ever written — spec.md §7's "complete or
    /// error" propagation policy.
    #[error("pipeline run cancelled")]
    Cancelled,

    /// A repository read or write failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

//! Errors produced by [`crate::Repository`] implementations.

use thiserror::Error;

/// What kind of record was being looked up when a `NotFound` occurred.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A [`flowtrace_types::Session`].
    Session,
    /// A stored [`flowtrace_types::WorkflowDefinition`].
    Workflow,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Workflow => write!(f, "workflow"),
        }
    }
}

/// Errors from storage operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested record doesn't exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Which kind of record was missing.
        kind: EntityKind,
        /// The id that was looked up.
        id: String,
    },

    /// The backend rejected or failed a read/write. Retrying may help if the
    /// backend is a remote store; the in-memory reference implementation
    /// never produces this variant.
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored value failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any other repository error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Whether retrying the operation unchanged might succeed. The
    /// in-memory reference implementation never fails this way; real
    /// backends (a database, object storage) can.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

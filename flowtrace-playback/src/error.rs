//! Errors from running `IntelligentPlayback`.

use flowtrace_repository::RepositoryError;
use thiserror::Error;

/// Errors from [`crate::run`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The workflow definition has no steps to guide playback with, and
    /// generative mode was not requested.
    #[error("workflow has no defined steps")]
    EmptyWorkflow,

    /// The run was cancelled before it could dispatch an action.
    #[error("playback run cancelled")]
    Cancelled,

    /// A repository read or write failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

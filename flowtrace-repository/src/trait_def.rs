//! The storage abstraction the pipeline and playback loop depend on.

use crate::error::RepositoryError;
use async_trait::async_trait;
use flowtrace_types::{PlaybackLogEntry, Session, SessionId, WorkflowDefinition, WorkflowId};
use serde_json::Value;

/// A stored workflow definition paired with its assigned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredWorkflow {
    /// Identifier assigned at creation.
    pub id: WorkflowId,
    /// The definition itself.
    pub definition: WorkflowDefinition,
}

/// Abstract persistence for sessions, workflow definitions, ad hoc config,
/// and playback logs (spec.md §6 "Repository"). One implementation
/// ([`crate::InMemoryRepository`]) is provided as a reference and for
/// tests; production embedders are expected to supply their own.
///
/// Ordering guarantee: `list_sessions`, `list_playback_logs_by_workflow`,
/// and `list_insights_by_site_pattern` return results newest-first by
/// persisted timestamp.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Persist a new session. Sessions are immutable once created; there is
    /// no `update_session`.
    async fn create_session(&self, session: Session) -> Result<(), RepositoryError>;

    /// Fetch a session by id.
    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError>;

    /// List every session recorded for a workflow name, newest-first.
    async fn list_sessions(&self, workflow_name: &str) -> Result<Vec<Session>, RepositoryError>;

    /// Remove a session. No-op if it doesn't exist.
    async fn delete_session(&self, id: &SessionId) -> Result<(), RepositoryError>;

    /// Persist a new workflow definition, assigning and returning its id.
    async fn create_workflow(
        &self,
        definition: WorkflowDefinition,
    ) -> Result<WorkflowId, RepositoryError>;

    /// Fetch a workflow definition by id.
    async fn get_workflow(
        &self,
        id: &WorkflowId,
    ) -> Result<Option<WorkflowDefinition>, RepositoryError>;

    /// List every stored workflow definition.
    async fn list_workflows(&self) -> Result<Vec<StoredWorkflow>, RepositoryError>;

    /// Replace a workflow definition's contents in place. Errors with
    /// [`RepositoryError::NotFound`] if `id` doesn't exist — this is an
    /// update, not an upsert.
    async fn update_workflow(
        &self,
        id: &WorkflowId,
        definition: WorkflowDefinition,
    ) -> Result<(), RepositoryError>;

    /// Remove a workflow definition. No-op if it doesn't exist.
    async fn delete_workflow(&self, id: &WorkflowId) -> Result<(), RepositoryError>;

    /// Store an arbitrary configuration value under `key`.
    async fn set_config(&self, key: &str, value: Value) -> Result<(), RepositoryError>;

    /// Fetch a configuration value by `key`.
    async fn get_config(&self, key: &str) -> Result<Option<Value>, RepositoryError>;

    /// Append one playback-run record.
    async fn append_playback_log(&self, entry: PlaybackLogEntry) -> Result<(), RepositoryError>;

    /// List every playback run recorded for a workflow, newest-first.
    async fn list_playback_logs_by_workflow(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<PlaybackLogEntry>, RepositoryError>;

    /// List the most recent `limit` playback runs for a site pattern,
    /// newest-first. `limit` defaults to 10 when `None`.
    async fn list_insights_by_site_pattern(
        &self,
        site_pattern: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PlaybackLogEntry>, RepositoryError>;
}

/// Default `limit` for [`Repository::list_insights_by_site_pattern`].
pub const DEFAULT_INSIGHT_LIMIT: usize = 10;

//! In-memory [`Repository`] implementation — the reference backend, used
//! in tests and by embedders with no durability requirement.

use crate::error::{EntityKind, RepositoryError};
use crate::trait_def::{Repository, StoredWorkflow, DEFAULT_INSIGHT_LIMIT};
use async_trait::async_trait;
use flowtrace_types::{PlaybackLogEntry, Session, SessionId, WorkflowDefinition, WorkflowId};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    sessions: HashMap<SessionId, Session>,
    workflows: HashMap<WorkflowId, WorkflowDefinition>,
    config: HashMap<String, Value>,
    playback_logs: Vec<PlaybackLogEntry>,
}

/// An in-memory [`Repository`] backed by a single `RwLock`. No persistence
/// across process restarts; suitable for tests, prototyping, and
/// single-process embedders.
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_session(&self, session: Session) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.sessions.get(id).cloned())
    }

    async fn list_sessions(&self, workflow_name: &str) -> Result<Vec<Session>, RepositoryError> {
        let state = self.state.read().await;
        let mut matches: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.workflow_name == workflow_name)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(matches)
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.sessions.remove(id);
        Ok(())
    }

    async fn create_workflow(
        &self,
        definition: WorkflowDefinition,
    ) -> Result<WorkflowId, RepositoryError> {
        let id = WorkflowId::new(uuid::Uuid::new_v4().to_string());
        let mut state = self.state.write().await;
        state.workflows.insert(id.clone(), definition);
        Ok(id)
    }

    async fn get_workflow(
        &self,
        id: &WorkflowId,
    ) -> Result<Option<WorkflowDefinition>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.workflows.get(id).cloned())
    }

    async fn list_workflows(&self) -> Result<Vec<StoredWorkflow>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .workflows
            .iter()
            .map(|(id, definition)| StoredWorkflow {
                id: id.clone(),
                definition: definition.clone(),
            })
            .collect())
    }

    async fn update_workflow(
        &self,
        id: &WorkflowId,
        definition: WorkflowDefinition,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.workflows.contains_key(id) {
            return Err(RepositoryError::NotFound {
                kind: EntityKind::Workflow,
                id: id.to_string(),
            });
        }
        state.workflows.insert(id.clone(), definition);
        Ok(())
    }

    async fn delete_workflow(&self, id: &WorkflowId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.workflows.remove(id);
        Ok(())
    }

    async fn set_config(&self, key: &str, value: Value) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.config.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_config(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.config.get(key).cloned())
    }

    async fn append_playback_log(&self, entry: PlaybackLogEntry) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.playback_logs.push(entry);
        Ok(())
    }

    async fn list_playback_logs_by_workflow(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<PlaybackLogEntry>, RepositoryError> {
        let state = self.state.read().await;
        let mut matches: Vec<PlaybackLogEntry> = state
            .playback_logs
            .iter()
            .filter(|e| e.workflow_id.as_ref() == Some(workflow_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(matches)
    }

    async fn list_insights_by_site_pattern(
        &self,
        site_pattern: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PlaybackLogEntry>, RepositoryError> {
        let state = self.state.read().await;
        let mut matches: Vec<PlaybackLogEntry> = state
            .playback_logs
            .iter()
            .filter(|e| e.site_pattern == site_pattern)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        matches.truncate(limit.unwrap_or(DEFAULT_INSIGHT_LIMIT));
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flowtrace_types::{
        AuthPattern, Confidence, Outcome, Returns,
    };

    fn session(id: &str, workflow: &str, recorded_at: chrono::DateTime<Utc>) -> Session {
        Session {
            id: SessionId::new(id),
            workflow_name: workflow.to_string(),
            url: "https://example.com".to_string(),
            started_at: 0,
            ended_at: 100,
            recorded_at,
            dom_events: vec![],
            network_events: vec![],
            correlations: None,
        }
    }

    fn definition(name: &str) -> WorkflowDefinition {
        WorkflowDefinition {
            name: name.to_string(),
            description: "".to_string(),
            confidence: Confidence::Low,
            steps: vec![],
            parameters: vec![],
            returns: Returns {
                description: "".to_string(),
                fields: vec![],
            },
            auth: AuthPattern::none(),
            base_url: "https://example.com".to_string(),
            recording_count: 1,
            last_recorded: Utc::now(),
        }
    }

    fn log(workflow_id: Option<WorkflowId>, site: &str, started_at: chrono::DateTime<Utc>) -> PlaybackLogEntry {
        PlaybackLogEntry {
            workflow_id,
            site_pattern: site.to_string(),
            started_at,
            outcome: Outcome::Success,
            actions: vec![],
            retries_used: 0,
            summary: None,
        }
    }

    #[tokio::test]
    async fn sessions_round_trip_and_list_newest_first() {
        let repo = InMemoryRepository::new();
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);
        repo.create_session(session("s1", "wf", t0)).await.unwrap();
        repo.create_session(session("s2", "wf", t1)).await.unwrap();

        let listed = repo.list_sessions("wf").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, SessionId::new("s2"));
        assert_eq!(listed[1].id, SessionId::new("s1"));

        repo.delete_session(&SessionId::new("s1")).await.unwrap();
        assert!(repo.get_session(&SessionId::new("s1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn workflow_update_requires_existing_id() {
        let repo = InMemoryRepository::new();
        let missing = WorkflowId::new("does-not-exist");
        let err = repo
            .update_workflow(&missing, definition("wf"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));

        let id = repo.create_workflow(definition("wf")).await.unwrap();
        let mut updated = definition("wf");
        updated.recording_count = 2;
        repo.update_workflow(&id, updated).await.unwrap();
        let fetched = repo.get_workflow(&id).await.unwrap().unwrap();
        assert_eq!(fetched.recording_count, 2);
    }

    #[tokio::test]
    async fn config_round_trips() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_config("k").await.unwrap().is_none());
        repo.set_config("k", serde_json::json!({"a": 1})).await.unwrap();
        assert_eq!(
            repo.get_config("k").await.unwrap(),
            Some(serde_json::json!({"a": 1}))
        );
    }

    #[tokio::test]
    async fn insights_are_capped_and_newest_first() {
        let repo = InMemoryRepository::new();
        let t0 = Utc::now();
        for i in 0..15 {
            repo.append_playback_log(log(None, "example.com/checkout", t0 + chrono::Duration::seconds(i)))
                .await
                .unwrap();
        }
        let insights = repo
            .list_insights_by_site_pattern("example.com/checkout", None)
            .await
            .unwrap();
        assert_eq!(insights.len(), DEFAULT_INSIGHT_LIMIT);
        assert!(insights[0].started_at > insights[1].started_at);
    }

    #[tokio::test]
    async fn playback_logs_filter_by_workflow() {
        let repo = InMemoryRepository::new();
        let wf_a = WorkflowId::new("a");
        let wf_b = WorkflowId::new("b");
        let t0 = Utc::now();
        repo.append_playback_log(log(Some(wf_a.clone()), "site", t0)).await.unwrap();
        repo.append_playback_log(log(Some(wf_b.clone()), "site", t0)).await.unwrap();

        let for_a = repo.list_playback_logs_by_workflow(&wf_a).await.unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].workflow_id, Some(wf_a));
    }
}

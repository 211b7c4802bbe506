#![deny(missing_docs)]
//! Orchestrates every analysis stage over a workflow's recorded sessions:
//! noise filtering and correlation per session, then parameterization,
//! chain detection, and auth detection across all of them, and finally
//! definition assembly. Propagation policy is complete-or-error — no
//! partial `WorkflowDefinition` is ever written.

mod error;
mod tracking;

pub use error::PipelineError;
pub use tracking::{DegradationReport, StageDegradation, TrackingGateway};

use flowtrace_gateway::Gateway;
use flowtrace_repository::Repository;
use flowtrace_types::WorkflowId;
use tokio_util::sync::CancellationToken;

/// The outcome of a successful pipeline run: the persisted workflow's id,
/// plus which stages (if any) fell back to heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// The id assigned by [`Repository::create_workflow`].
    pub workflow_id: WorkflowId,
    /// Which stages degraded to a heuristic result this run.
    pub degradation: DegradationReport,
}

fn check_cancelled(cancellation: &CancellationToken) -> Result<(), PipelineError> {
    if cancellation.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    Ok(())
}

/// Run every analysis stage over `workflow_name`'s recorded sessions and
/// persist the resulting `WorkflowDefinition`. `sessions[0]` (newest-first
/// from the repository) is used as the reference session whose DOM order
/// drives step ordering, matching the convention every stage crate
/// already assumes.
///
/// Checks `cancellation` before every gateway or repository call
/// (the pipeline's suspension points). A cancellation mid-run yields
/// [`PipelineError::Cancelled`] and writes nothing.
pub async fn run(
    gateway: &dyn Gateway,
    repository: &dyn Repository,
    workflow_name: &str,
    cancellation: &CancellationToken,
) -> Result<PipelineRun, PipelineError> {
    let tracking = TrackingGateway::new(gateway);

    check_cancelled(cancellation)?;
    let sessions = repository.list_sessions(workflow_name).await?;
    if sessions.is_empty() {
        return Err(PipelineError::NoSessions(workflow_name.to_string()));
    }

    let mut core_indices = Vec::with_capacity(sessions.len());
    let mut correlations = Vec::with_capacity(sessions.len());

    for session in &sessions {
        check_cancelled(cancellation)?;
        let noise = flowtrace_noise::filter(&tracking, session, &sessions).await;

        check_cancelled(cancellation)?;
        let session_correlations = flowtrace_correlate::correlate(
            &tracking,
            &session.dom_events,
            &session.network_events,
            &noise.core_indices,
            &noise.supporting_indices,
        )
        .await;

        core_indices.push(noise.core_indices);
        correlations.push(session_correlations);
    }

    check_cancelled(cancellation)?;
    let parameters = flowtrace_parameterize::parameterize(&tracking, &sessions, &correlations, &core_indices).await;

    check_cancelled(cancellation)?;
    let chains = flowtrace_chains::detect(&tracking, &sessions, &correlations, &core_indices).await;

    check_cancelled(cancellation)?;
    let auth = flowtrace_auth::detect(&tracking, &sessions).await;

    check_cancelled(cancellation)?;
    let definition = flowtrace_assemble::assemble(
        &tracking,
        &sessions,
        &correlations,
        &core_indices,
        parameters,
        &chains,
        auth,
        workflow_name.to_string(),
    )
    .await;

    check_cancelled(cancellation)?;
    let workflow_id = repository.create_workflow(definition).await?;

    Ok(PipelineRun {
        workflow_id,
        degradation: tracking.report(),
    })
}

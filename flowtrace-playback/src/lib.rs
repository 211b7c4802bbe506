#![deny(missing_docs)]
//! `IntelligentPlayback`: drive a browser through a `WorkflowDefinition`,
//! adapting to pages that differ from the ones it was recorded on
//! (spec.md §4.7).

pub mod driver;
mod error;
mod insight;
mod mode;
mod snapshot;

pub use driver::BrowserDriver;
pub use error::PlaybackError;
pub use snapshot::{ActionResult, BoundingBox, FormSummary, Heading, InteractiveElement, PageSnapshot};

use chrono::Utc;
use flowtrace_gateway::schema::{
    Action, ActionKind, InteractiveElementSummary, NextActionRequest, PlaybackContext, PlaybackMode,
};
use flowtrace_gateway::Gateway;
use flowtrace_repository::Repository;
use flowtrace_types::{CompletedAction, Outcome, PlaybackLogEntry, WorkflowDefinition, WorkflowId};
use tokio_util::sync::CancellationToken;

/// Upper bound on actions dispatched in a single run, regardless of outcome.
pub const MAX_ACTIONS: u32 = 100;

/// Consecutive action failures before a run gives up.
pub const MAX_RETRIES: u32 = 3;

/// What a completed playback run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRunResult {
    /// How the run ended.
    pub outcome: Outcome,
    /// Every action the loop took, in order.
    pub actions: Vec<CompletedAction>,
    /// Total retries consumed across the whole run.
    pub retries_used: u32,
}

fn site_pattern(base_url: &str) -> String {
    let Ok(parsed) = url::Url::parse(base_url) else {
        return base_url.to_string();
    };
    let host = parsed.host_str().unwrap_or("");
    let first_segment = parsed.path_segments().and_then(|mut s| s.next()).filter(|s| !s.is_empty());
    match first_segment {
        Some(segment) => format!("{host}/{segment}"),
        None => host.to_string(),
    }
}

fn to_element_summary(element: &InteractiveElement) -> InteractiveElementSummary {
    InteractiveElementSummary {
        index: element.index,
        tag: element.tag.clone(),
        element_type: element.element_type.clone(),
        aria_label: element.aria_label.clone(),
        text_content: element.text_content.clone(),
        placeholder: element.placeholder.clone(),
        disabled: element.disabled,
    }
}

fn describe_action(action: &Action, selector: Option<&str>) -> String {
    match action.kind {
        ActionKind::Click => format!("click {}", selector.unwrap_or("?")),
        ActionKind::Input => format!("input {} into {}", action.value.as_deref().unwrap_or(""), selector.unwrap_or("?")),
        ActionKind::Select => format!("select {} in {}", action.value.as_deref().unwrap_or(""), selector.unwrap_or("?")),
        ActionKind::Keydown => format!("keydown {} on {}", action.key.as_deref().unwrap_or(""), selector.unwrap_or("?")),
        ActionKind::Navigate => format!("navigate to {}", action.value.as_deref().unwrap_or("")),
        ActionKind::Wait => "wait".to_string(),
        ActionKind::Scroll => "scroll".to_string(),
        ActionKind::Done => "done".to_string(),
        ActionKind::Fail => "fail".to_string(),
    }
}

fn check_cancelled(cancellation: &CancellationToken) -> Result<(), PlaybackError> {
    if cancellation.is_cancelled() {
        return Err(PlaybackError::Cancelled);
    }
    Ok(())
}

/// Run `IntelligentPlayback` against `definition`, persisting a
/// [`PlaybackLogEntry`] regardless of outcome so future runs against the
/// same site pattern benefit from this one's insight.
pub async fn run(
    gateway: &dyn Gateway,
    repository: &dyn Repository,
    driver: &dyn BrowserDriver,
    definition: &WorkflowDefinition,
    workflow_id: Option<WorkflowId>,
    cancellation: &CancellationToken,
) -> Result<PlaybackRunResult, PlaybackError> {
    if definition.steps.is_empty() {
        return Err(PlaybackError::EmptyWorkflow);
    }

    let started_at = Utc::now();
    let pattern = site_pattern(&definition.base_url);

    check_cancelled(cancellation)?;
    let intent = match gateway
        .intent(flowtrace_gateway::schema::IntentRequest {
            workflow_name: definition.name.clone(),
            step_descriptions: definition.steps.iter().map(|s| s.description.clone()).collect(),
            params: definition.parameters.iter().map(|p| (p.name.clone(), p.example.clone())).collect(),
        })
        .await
    {
        Ok(response) => response.intent,
        Err(err) => {
            tracing::warn!(error = %err, "intent summarization failed, using a mechanical fallback");
            format!("Replay the \"{}\" workflow", definition.name)
        }
    };

    check_cancelled(cancellation)?;
    let insights: Vec<String> = repository
        .list_insights_by_site_pattern(&pattern, None)
        .await?
        .into_iter()
        .filter_map(|entry| entry.summary)
        .collect();

    let defined_steps: Vec<String> = definition.steps.iter().map(|s| s.description.clone()).collect();
    let params: Vec<(String, String)> = definition.parameters.iter().map(|p| (p.name.clone(), p.example.clone())).collect();
    let total_steps = definition.steps.len() as u32;

    let mut step_index = 0u32;
    let mut consecutive_failures = 0u32;
    let mut retries_used = 0u32;
    let mut last_error: Option<String> = None;
    let mut completed: Vec<CompletedAction> = Vec::new();
    let mut error_reasons: Vec<String> = Vec::new();
    let mut outcome = Outcome::Exhausted;

    for _ in 0..MAX_ACTIONS {
        check_cancelled(cancellation)?;

        let shot = driver.capture_screenshot().await.unwrap_or_default();
        let snap = match driver.snapshot_page().await {
            Ok(snap) => snap,
            Err(err) => {
                last_error = Some(err.clone());
                error_reasons.push(err);
                consecutive_failures += 1;
                retries_used += 1;
                if consecutive_failures >= MAX_RETRIES {
                    outcome = Outcome::Failed;
                    break;
                }
                continue;
            }
        };

        let current_step_defined = (step_index as usize) < definition.steps.len();
        let selected_mode = mode::select(last_error.as_deref(), current_step_defined);
        let step_intent = if selected_mode == PlaybackMode::Guided {
            definition.steps.get(step_index as usize).map(|s| s.description.clone())
        } else {
            None
        };

        let context = PlaybackContext {
            intent: intent.clone(),
            step_intent,
            step_index,
            total_steps,
            completed: completed.iter().map(|a| a.description.clone()).collect(),
            params: params.clone(),
            defined_steps: defined_steps.clone(),
            last_error: last_error.clone(),
            insights: insights.clone(),
        };

        check_cancelled(cancellation)?;
        let decision = match gateway
            .next_action(
                &shot,
                NextActionRequest {
                    url: snap.url.clone(),
                    title: snap.title.clone(),
                    elements: snap.elements.iter().map(to_element_summary).collect(),
                    modal_open: snap.modal_open,
                    context,
                    mode: selected_mode,
                },
            )
            .await
        {
            Ok(decision) => decision,
            Err(err) => {
                tracing::warn!(error = %err, "next-action decision failed, ending run");
                outcome = Outcome::Failed;
                last_error = Some(err.to_string());
                break;
            }
        };

        if decision.action.kind == ActionKind::Done {
            outcome = Outcome::Success;
            break;
        }
        if decision.action.kind == ActionKind::Fail {
            outcome = Outcome::Failed;
            last_error = Some(decision.action.reasoning.clone());
            break;
        }

        let selector = match decision.action.kind {
            ActionKind::Wait | ActionKind::Scroll | ActionKind::Navigate => None,
            _ => match decision.action.element_index.and_then(|i| snap.selector_for(i)) {
                Some(selector) => Some(selector),
                None => {
                    tracing::warn!(index = ?decision.action.element_index, "action referenced an out-of-range element index");
                    None
                }
            },
        };

        let result = match decision.action.kind {
            ActionKind::Navigate => {
                driver.navigate(decision.action.value.as_deref().unwrap_or("")).await
            }
            _ if selector.is_none()
                && matches!(decision.action.kind, ActionKind::Click | ActionKind::Input | ActionKind::Select | ActionKind::Keydown) =>
            {
                ActionResult::failed("element index out of range")
            }
            _ => driver.execute_action(&decision.action, selector).await,
        };

        let source_step = (selected_mode == PlaybackMode::Guided).then_some(step_index);
        completed.push(CompletedAction {
            index: completed.len() as u32,
            description: describe_action(&decision.action, selector),
            succeeded: result.success,
            source_step,
        });

        last_error = result.error.clone();
        if let Some(reason) = &result.error {
            error_reasons.push(reason.clone());
        }

        if !result.success {
            consecutive_failures += 1;
            retries_used += 1;
            if consecutive_failures >= MAX_RETRIES {
                outcome = Outcome::Failed;
                break;
            }
        } else {
            consecutive_failures = 0;
            if decision.step_advanced && step_index + 1 < total_steps {
                step_index += 1;
            }
            if decision.workflow_complete {
                outcome = Outcome::Success;
                break;
            }
        }

        check_cancelled(cancellation)?;
        driver.await_load_stable().await;
    }

    let summary = insight::build_summary(outcome, &completed, &error_reasons);
    let entry = PlaybackLogEntry {
        workflow_id,
        site_pattern: pattern,
        started_at,
        outcome,
        actions: completed.clone(),
        retries_used,
        summary: Some(summary),
    };
    repository.append_playback_log(entry).await?;

    Ok(PlaybackRunResult {
        outcome,
        actions: completed,
        retries_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver::mock::MockDriver;
    use flowtrace_gateway::mock::MockGateway;
    use flowtrace_gateway::schema::{IntentResponse, NextActionResponse};
    use flowtrace_repository::InMemoryRepository;
    use flowtrace_types::{AuthPattern, Confidence, RequestTemplate, ResponseSpec, Returns, StepOrder, WorkflowStep};
    use std::collections::HashMap;

    fn workflow() -> WorkflowDefinition {
        WorkflowDefinition {
            name: "checkout".to_string(),
            description: "Check out a cart".to_string(),
            confidence: Confidence::Low,
            steps: vec![WorkflowStep {
                order: StepOrder::new(0),
                description: "click #submit".to_string(),
                dom_action: None,
                request: RequestTemplate {
                    method: "POST".to_string(),
                    path_template: "/checkout".to_string(),
                    query_template: HashMap::new(),
                    headers: HashMap::new(),
                    body_template: None,
                },
                input_mappings: vec![],
                response: ResponseSpec { expected_status: 200, extract_fields: vec![] },
                depends_on: None,
                is_loop_step: false,
                loop_condition: None,
                opens_popup: false,
                popup_actions: vec![],
            }],
            parameters: vec![],
            returns: Returns { description: "Nothing".to_string(), fields: vec![] },
            auth: AuthPattern::none(),
            base_url: "https://shop.example.com/cart".to_string(),
            recording_count: 1,
            last_recorded: Utc::now(),
        }
    }

    fn snap() -> PageSnapshot {
        PageSnapshot {
            url: "https://shop.example.com/cart".to_string(),
            title: "Cart".to_string(),
            elements: vec![InteractiveElement {
                index: 0,
                tag: "button".to_string(),
                element_type: None,
                selector: "#submit".to_string(),
                aria_label: None,
                text_content: Some("Submit".to_string()),
                placeholder: None,
                name: None,
                role: None,
                disabled: false,
                bounding_box: BoundingBox { x: 0.0, y: 0.0, width: 10.0, height: 10.0 },
            }],
            forms: vec![],
            modal_open: false,
            modal_selector: None,
            headings: vec![],
        }
    }

    fn action(kind: ActionKind, element_index: Option<u32>) -> Action {
        Action {
            kind,
            element_index,
            value: None,
            key: None,
            reasoning: "because".to_string(),
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn empty_workflow_is_rejected() {
        let gateway = MockGateway::new();
        let repository = InMemoryRepository::new();
        let driver = MockDriver::new();
        let mut empty = workflow();
        empty.steps.clear();
        let cancellation = CancellationToken::new();

        let result = run(&gateway, &repository, &driver, &empty, None, &cancellation).await;
        assert!(matches!(result, Err(PlaybackError::EmptyWorkflow)));
    }

    #[tokio::test]
    async fn a_done_action_ends_the_run_successfully() {
        let gateway = MockGateway::new();
        gateway.push_intent(Ok(IntentResponse { intent: "check out".to_string() }));
        gateway.push_next_action(Ok(NextActionResponse {
            action: action(ActionKind::Done, None),
            step_advanced: true,
            workflow_complete: true,
        }));

        let driver = MockDriver::new();
        driver.push_screenshot(Ok(vec![]));
        driver.push_snapshot(Ok(snap()));

        let repository = InMemoryRepository::new();
        let cancellation = CancellationToken::new();

        let def = workflow();
        let result = run(&gateway, &repository, &driver, &def, None, &cancellation).await.unwrap();
        assert_eq!(result.outcome, Outcome::Success);

        let logs = repository.list_playback_logs_by_workflow(&WorkflowId::new("missing")).await.unwrap();
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn three_consecutive_failures_end_the_run_as_failed() {
        let gateway = MockGateway::new();
        gateway.push_intent(Ok(IntentResponse { intent: "check out".to_string() }));
        for _ in 0..3 {
            gateway.push_next_action(Ok(NextActionResponse {
                action: action(ActionKind::Click, Some(0)),
                step_advanced: false,
                workflow_complete: false,
            }));
        }

        let driver = MockDriver::new();
        for _ in 0..3 {
            driver.push_screenshot(Ok(vec![]));
            driver.push_snapshot(Ok(snap()));
            driver.push_action_result(ActionResult::failed("element not found"));
        }

        let repository = InMemoryRepository::new();
        let cancellation = CancellationToken::new();

        let def = workflow();
        let result = run(&gateway, &repository, &driver, &def, Some(WorkflowId::new("wf1")), &cancellation)
            .await
            .unwrap();
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.retries_used, 3);

        let logs = repository.list_playback_logs_by_workflow(&WorkflowId::new("wf1")).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].outcome, Outcome::Failed);
        assert!(logs[0].summary.as_ref().unwrap().contains("element not found"));
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop_before_the_next_action() {
        let gateway = MockGateway::new();
        gateway.push_intent(Ok(IntentResponse { intent: "check out".to_string() }));

        let driver = MockDriver::new();
        let repository = InMemoryRepository::new();
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let def = workflow();
        let result = run(&gateway, &repository, &driver, &def, None, &cancellation).await;
        assert!(matches!(result, Err(PlaybackError::Cancelled)));
    }
}

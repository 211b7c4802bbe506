#![deny(missing_docs)]
//! Stage 6 of the analysis pipeline: fuse every upstream stage's output
//! into a single `WorkflowDefinition`.

mod dom_action;
mod extract;
mod templates;

use chrono::Utc;
use flowtrace_chains::ChainDetectionResult;
use flowtrace_gateway::schema::{StepSummary, WorkflowMetadataRequest};
use flowtrace_gateway::Gateway;
use flowtrace_parameterize::reference_steps;
use flowtrace_types::{
    AuthPattern, Confidence, Correlation, ParameterDef, ResponseSpec, RequestTemplate, Returns, ReturnField,
    ReturnSource, Session, StepInputMapping, StepOrder, WorkflowDefinition, WorkflowStep,
};

fn compose_description(step: &WorkflowStep) -> String {
    match &step.dom_action {
        Some(action) => format!(
            "{:?} \"{}\" — {} {}",
            action.kind, action.selector, step.request.method, step.request.path_template
        ),
        None => format!("{} {}", step.request.method, step.request.path_template),
    }
}

fn base_url(event_url: &str) -> String {
    match url::Url::parse(event_url) {
        Ok(u) => format!("{}://{}", u.scheme(), u.host_str().unwrap_or("")),
        Err(_) => event_url.to_string(),
    }
}

fn build_step(
    order: usize,
    event: &flowtrace_types::NetworkEvent,
    dom: Option<&flowtrace_types::DomEvent>,
    params: &[ParameterDef],
    chains: &ChainDetectionResult,
) -> WorkflowStep {
    let step_order = StepOrder::new(order as u32);
    let step_params = templates::step_params(params, order as u32);

    let request = RequestTemplate {
        method: event.method.clone(),
        path_template: templates::path_template(event, &step_params),
        query_template: templates::query_template(event, &step_params),
        headers: templates::clean_headers(event, &step_params),
        body_template: templates::body_template(event, &step_params),
    };

    let dom_action = dom.map(|d| dom_action::build(d, params, order as u32));

    let incoming: Vec<&flowtrace_chains::Chain> =
        chains.chains.iter().filter(|c| c.to_step == order && !c.is_parallel).collect();
    let input_mappings: Vec<StepInputMapping> = incoming.iter().flat_map(|c| c.input_mappings.clone()).collect();
    let depends_on = incoming
        .iter()
        .find(|c| c.input_mappings.is_empty())
        .map(|c| StepOrder::new(c.from_step as u32));

    let response = ResponseSpec {
        expected_status: event.response_status,
        extract_fields: extract::extract_fields(event),
    };

    let mut step = WorkflowStep {
        order: step_order,
        description: String::new(),
        dom_action,
        request,
        input_mappings,
        response,
        depends_on,
        is_loop_step: chains.pagination_steps.contains(&order),
        loop_condition: None,
        opens_popup: false,
        popup_actions: vec![],
    };
    step.description = compose_description(&step);
    step
}

fn fallback_returns(steps: &[WorkflowStep]) -> Returns {
    let Some(last) = steps.last() else {
        return Returns {
            description: "No steps were recorded".to_string(),
            fields: vec![],
        };
    };
    let fields = last
        .response
        .extract_fields
        .iter()
        .take(10)
        .map(|f| ReturnField {
            name: f.name.clone(),
            field_type: f.field_type,
            description: f.description.clone(),
            source: ReturnSource {
                step: last.order,
                json_path: f.json_path.clone(),
            },
        })
        .collect();
    Returns {
        description: "Fields returned by the workflow's final step".to_string(),
        fields,
    }
}

/// Run Stage 6, fusing every upstream result into one `WorkflowDefinition`.
/// `sessions[0]` is the reference session whose DOM order drives step
/// ordering, matching the convention `flowtrace-parameterize` and
/// `flowtrace-chains` already use.
pub async fn assemble(
    gateway: &dyn Gateway,
    sessions: &[Session],
    correlations: &[Vec<Correlation>],
    core_indices: &[Vec<usize>],
    params: Vec<ParameterDef>,
    chains: &ChainDetectionResult,
    auth: AuthPattern,
    workflow_name: String,
) -> WorkflowDefinition {
    let reference = &sessions[0];
    let ref_steps = reference_steps(&correlations[0], &core_indices[0]);

    let steps: Vec<WorkflowStep> = ref_steps
        .iter()
        .map(|step| {
            let event = &reference.network_events[step.network_event_index];
            let dom = reference.dom_events.get(step.dom_event_index);
            build_step(step.ordinal, event, dom, &params, chains)
        })
        .collect();

    let base_url = ref_steps
        .first()
        .map(|s| base_url(&reference.network_events[s.network_event_index].url))
        .or_else(|| reference.network_events.first().map(|e| base_url(&e.url)))
        .unwrap_or_default();

    let metadata_request = WorkflowMetadataRequest {
        steps: steps
            .iter()
            .map(|s| StepSummary {
                order: s.order.index(),
                description: s.description.clone(),
                extracted_fields: s.response.extract_fields.iter().map(|f| f.name.clone()).collect(),
            })
            .collect(),
        parameter_names: params.iter().map(|p| p.name.clone()).collect(),
    };

    let (description, returns) = match gateway.workflow_metadata(metadata_request).await {
        Ok(response) => (
            response.description,
            Returns {
                description: response.returns_description,
                fields: response.returns_fields,
            },
        ),
        Err(err) => {
            tracing::warn!(error = %err, "workflow metadata authoring failed, using mechanical fallback");
            (
                format!("Replay workflow \"{}\" ({} steps)", workflow_name, steps.len()),
                fallback_returns(&steps),
            )
        }
    };

    let confidence = Confidence::score(sessions.len(), !chains.chains.is_empty(), params.len());
    let last_recorded = sessions.iter().map(|s| s.recorded_at).max().unwrap_or_else(Utc::now);

    WorkflowDefinition {
        name: workflow_name,
        description,
        confidence,
        steps,
        parameters: params,
        returns,
        auth,
        base_url,
        recording_count: sessions.len(),
        last_recorded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowtrace_gateway::mock::MockGateway;
    use flowtrace_gateway::schema::WorkflowMetadataResponse;
    use flowtrace_gateway::GatewayError;
    use flowtrace_types::{AuthKind, DomEvent, DomEventKind, ElementDescriptor, NetworkEvent, SessionId};
    use std::collections::HashMap;

    fn dom() -> DomEvent {
        DomEvent {
            timestamp: 0,
            kind: DomEventKind::Click,
            primary_selector: "#go".to_string(),
            fallback_selectors: vec![],
            element: ElementDescriptor::default(),
            value: None,
        }
    }

    fn net(url: &str, body: Option<&str>) -> NetworkEvent {
        NetworkEvent {
            timestamp: 0,
            method: "GET".to_string(),
            url: url.to_string(),
            request_headers: HashMap::new(),
            request_body: None,
            response_status: 200,
            response_headers: HashMap::new(),
            response_body: body.map(str::to_string),
        }
    }

    fn session(url: &str, body: Option<&str>) -> Session {
        Session {
            id: SessionId::new("s"),
            workflow_name: "checkout".to_string(),
            url: "https://example.com".to_string(),
            started_at: 0,
            ended_at: 1000,
            recorded_at: Utc::now(),
            dom_events: vec![dom()],
            network_events: vec![net(url, body)],
            correlations: None,
        }
    }

    fn corr() -> Correlation {
        Correlation {
            dom_event_index: 0,
            network_event_indices: vec![0],
            min_time_gap: 0,
        }
    }

    fn empty_chains() -> ChainDetectionResult {
        ChainDetectionResult {
            chains: vec![],
            parallel_groups: vec![],
            pagination_steps: vec![],
            execution_order: vec![0],
        }
    }

    #[tokio::test]
    async fn assembles_a_single_step_definition() {
        let gateway = MockGateway::new();
        gateway.push_workflow_metadata(Ok(WorkflowMetadataResponse {
            description: "Fetch an order".to_string(),
            returns_description: "The order".to_string(),
            returns_fields: vec![],
        }));

        let s = session("https://api.example.com/orders/1", Some(r#"{"id":1}"#));
        let definition = assemble(
            &gateway,
            &[s],
            &[vec![corr()]],
            &[vec![0]],
            vec![],
            &empty_chains(),
            AuthPattern::none(),
            "checkout".to_string(),
        )
        .await;

        assert_eq!(definition.name, "checkout");
        assert_eq!(definition.base_url, "https://api.example.com");
        assert_eq!(definition.steps.len(), 1);
        assert!(definition.steps_are_densely_ordered());
        assert_eq!(definition.description, "Fetch an order");
    }

    #[tokio::test]
    async fn metadata_failure_falls_back_mechanically() {
        let gateway = MockGateway::new();
        gateway.push_workflow_metadata(Err(GatewayError::Transient("boom".to_string())));

        let s = session("https://api.example.com/orders/1", Some(r#"{"id":1}"#));
        let definition = assemble(
            &gateway,
            &[s],
            &[vec![corr()]],
            &[vec![0]],
            vec![],
            &empty_chains(),
            AuthPattern::none(),
            "checkout".to_string(),
        )
        .await;

        assert!(definition.description.contains("checkout"));
        assert_eq!(definition.returns.fields[0].name, "id");
        assert_eq!(definition.auth.kind, AuthKind::Custom);
    }
}

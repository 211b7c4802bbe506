//! A scriptable [`Gateway`] for tests, mirroring the `MockProvider` pattern
//! used throughout the workspace: a queue of canned results plus a capture
//! of every call made, so tests can assert both behavior and prompts sent.

use crate::error::GatewayError;
use crate::schema::*;
use crate::trait_def::Gateway;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One canned call-and-response, recorded for later inspection.
#[derive(Debug, Clone)]
pub enum Call {
    /// A `classify` call.
    Classify(ClassifyRequest),
    /// A `correlate-validate` call.
    CorrelateValidate(CorrelateValidateRequest),
    /// A `parameterize` call.
    Parameterize(ParameterizeRequest),
    /// A `validate-chains` call.
    ValidateChains(ValidateChainsRequest),
    /// A `detect-auth` call.
    DetectAuth(DetectAuthRequest),
    /// A `workflow-metadata` call.
    WorkflowMetadata(WorkflowMetadataRequest),
    /// A `next-action` call.
    NextAction(NextActionRequest),
    /// An `intent` call.
    Intent(IntentRequest),
}

/// A [`Gateway`] whose responses are pre-scripted per method. Each method
/// pops the next queued result (panicking if the queue is empty) and
/// records the request it was called with.
#[derive(Default)]
pub struct MockGateway {
    classify: Mutex<VecDeque<Result<ClassifyResponse, GatewayError>>>,
    correlate_validate: Mutex<VecDeque<Result<CorrelateValidateResponse, GatewayError>>>,
    parameterize: Mutex<VecDeque<Result<ParameterizeResponse, GatewayError>>>,
    validate_chains: Mutex<VecDeque<Result<ValidateChainsResponse, GatewayError>>>,
    detect_auth: Mutex<VecDeque<Result<DetectAuthResponse, GatewayError>>>,
    workflow_metadata: Mutex<VecDeque<Result<WorkflowMetadataResponse, GatewayError>>>,
    next_action: Mutex<VecDeque<Result<NextActionResponse, GatewayError>>>,
    intent: Mutex<VecDeque<Result<IntentResponse, GatewayError>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockGateway {
    /// An empty mock; every method panics until a response is queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a `classify` response.
    pub fn push_classify(&self, result: Result<ClassifyResponse, GatewayError>) {
        self.classify.lock().unwrap().push_back(result);
    }

    /// Queue a `correlate-validate` response.
    pub fn push_correlate_validate(&self, result: Result<CorrelateValidateResponse, GatewayError>) {
        self.correlate_validate.lock().unwrap().push_back(result);
    }

    /// Queue a `parameterize` response.
    pub fn push_parameterize(&self, result: Result<ParameterizeResponse, GatewayError>) {
        self.parameterize.lock().unwrap().push_back(result);
    }

    /// Queue a `validate-chains` response.
    pub fn push_validate_chains(&self, result: Result<ValidateChainsResponse, GatewayError>) {
        self.validate_chains.lock().unwrap().push_back(result);
    }

    /// Queue a `detect-auth` response.
    pub fn push_detect_auth(&self, result: Result<DetectAuthResponse, GatewayError>) {
        self.detect_auth.lock().unwrap().push_back(result);
    }

    /// Queue a `workflow-metadata` response.
    pub fn push_workflow_metadata(&self, result: Result<WorkflowMetadataResponse, GatewayError>) {
        self.workflow_metadata.lock().unwrap().push_back(result);
    }

    /// Queue a `next-action` response.
    pub fn push_next_action(&self, result: Result<NextActionResponse, GatewayError>) {
        self.next_action.lock().unwrap().push_back(result);
    }

    /// Queue an `intent` response.
    pub fn push_intent(&self, result: Result<IntentResponse, GatewayError>) {
        self.intent.lock().unwrap().push_back(result);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

fn pop<T>(queue: &Mutex<VecDeque<Result<T, GatewayError>>>) -> Result<T, GatewayError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .expect("MockGateway: no more responses queued for this method")
}

#[async_trait]
impl Gateway for MockGateway {
    async fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, GatewayError> {
        self.calls.lock().unwrap().push(Call::Classify(request));
        pop(&self.classify)
    }

    async fn correlate_validate(
        &self,
        request: CorrelateValidateRequest,
    ) -> Result<CorrelateValidateResponse, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::CorrelateValidate(request));
        pop(&self.correlate_validate)
    }

    async fn parameterize(
        &self,
        request: ParameterizeRequest,
    ) -> Result<ParameterizeResponse, GatewayError> {
        self.calls.lock().unwrap().push(Call::Parameterize(request));
        pop(&self.parameterize)
    }

    async fn validate_chains(
        &self,
        request: ValidateChainsRequest,
    ) -> Result<ValidateChainsResponse, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::ValidateChains(request));
        pop(&self.validate_chains)
    }

    async fn detect_auth(
        &self,
        request: DetectAuthRequest,
    ) -> Result<DetectAuthResponse, GatewayError> {
        self.calls.lock().unwrap().push(Call::DetectAuth(request));
        pop(&self.detect_auth)
    }

    async fn workflow_metadata(
        &self,
        request: WorkflowMetadataRequest,
    ) -> Result<WorkflowMetadataResponse, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::WorkflowMetadata(request));
        pop(&self.workflow_metadata)
    }

    async fn next_action(
        &self,
        _screenshot: &[u8],
        request: NextActionRequest,
    ) -> Result<NextActionResponse, GatewayError> {
        self.calls.lock().unwrap().push(Call::NextAction(request));
        pop(&self.next_action)
    }

    async fn intent(&self, request: IntentRequest) -> Result<IntentResponse, GatewayError> {
        self.calls.lock().unwrap().push(Call::Intent(request));
        pop(&self.intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_queued_response_and_records_call() {
        let mock = MockGateway::new();
        mock.push_intent(Ok(IntentResponse {
            intent: "buy a widget".to_string(),
        }));
        let response = mock
            .intent(IntentRequest {
                workflow_name: "checkout".to_string(),
                step_descriptions: vec![],
                params: vec![],
            })
            .await
            .unwrap();
        assert_eq!(response.intent, "buy a widget");
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    #[should_panic(expected = "no more responses queued")]
    async fn mock_panics_when_queue_is_empty() {
        let mock = MockGateway::new();
        let _ = mock
            .intent(IntentRequest {
                workflow_name: "checkout".to_string(),
                step_descriptions: vec![],
                params: vec![],
            })
            .await;
    }
}

//! A [`Gateway`] decorator that records which calls failed, so the
//! pipeline can attach a [`DegradationReport`] to its output instead of
//! leaving degradation only visible in logs (spec.md §7, "the degradation
//! is logged and reflected in the overall confidence").

use async_trait::async_trait;
use flowtrace_gateway::schema::*;
use flowtrace_gateway::{Gateway, GatewayError};
use std::sync::Mutex;

/// One stage whose LLM call failed and fell back to a heuristic result.
#[derive(Debug, Clone, PartialEq)]
pub struct StageDegradation {
    /// The gateway function that failed.
    pub stage: &'static str,
    /// The error's display form.
    pub reason: String,
}

/// Machine-readable record of every stage that degraded during a pipeline
/// run, for callers outside this core that want to surface it without
/// scraping logs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DegradationReport {
    /// Every degraded stage, in the order its call failed.
    pub degradations: Vec<StageDegradation>,
}

impl DegradationReport {
    /// Whether any stage fell back to a heuristic result this run.
    pub fn any_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Wraps a [`Gateway`] and records every failing call by name.
pub struct TrackingGateway<'a> {
    inner: &'a dyn Gateway,
    degradations: Mutex<Vec<StageDegradation>>,
}

impl<'a> TrackingGateway<'a> {
    /// Wrap `inner`, tracking nothing yet.
    pub fn new(inner: &'a dyn Gateway) -> Self {
        Self {
            inner,
            degradations: Mutex::new(Vec::new()),
        }
    }

    /// Drain everything tracked so far into a [`DegradationReport`].
    pub fn report(&self) -> DegradationReport {
        DegradationReport {
            degradations: self.degradations.lock().unwrap().clone(),
        }
    }

    fn record(&self, stage: &'static str, err: &GatewayError) {
        self.degradations.lock().unwrap().push(StageDegradation {
            stage,
            reason: err.to_string(),
        });
    }
}

#[async_trait]
impl Gateway for TrackingGateway<'_> {
    async fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, GatewayError> {
        let result = self.inner.classify(request).await;
        if let Err(err) = &result {
            self.record("noise_filter", err);
        }
        result
    }

    async fn correlate_validate(
        &self,
        request: CorrelateValidateRequest,
    ) -> Result<CorrelateValidateResponse, GatewayError> {
        let result = self.inner.correlate_validate(request).await;
        if let Err(err) = &result {
            self.record("correlator", err);
        }
        result
    }

    async fn parameterize(&self, request: ParameterizeRequest) -> Result<ParameterizeResponse, GatewayError> {
        let result = self.inner.parameterize(request).await;
        if let Err(err) = &result {
            self.record("parameterizer", err);
        }
        result
    }

    async fn validate_chains(&self, request: ValidateChainsRequest) -> Result<ValidateChainsResponse, GatewayError> {
        let result = self.inner.validate_chains(request).await;
        if let Err(err) = &result {
            self.record("chain_detector", err);
        }
        result
    }

    async fn detect_auth(&self, request: DetectAuthRequest) -> Result<DetectAuthResponse, GatewayError> {
        let result = self.inner.detect_auth(request).await;
        if let Err(err) = &result {
            self.record("auth_detector", err);
        }
        result
    }

    async fn workflow_metadata(
        &self,
        request: WorkflowMetadataRequest,
    ) -> Result<WorkflowMetadataResponse, GatewayError> {
        let result = self.inner.workflow_metadata(request).await;
        if let Err(err) = &result {
            self.record("definition_assembler", err);
        }
        result
    }

    async fn next_action(
        &self,
        screenshot: &[u8],
        request: NextActionRequest,
    ) -> Result<NextActionResponse, GatewayError> {
        self.inner.next_action(screenshot, request).await
    }

    async fn intent(&self, request: IntentRequest) -> Result<IntentResponse, GatewayError> {
        self.inner.intent(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowtrace_gateway::mock::MockGateway;

    #[tokio::test]
    async fn failed_call_is_recorded() {
        let mock = MockGateway::new();
        mock.push_classify(Err(GatewayError::Transient("boom".to_string())));
        let tracking = TrackingGateway::new(&mock);

        let _ = tracking
            .classify(ClassifyRequest {
                events: vec![],
                dom_context: vec![],
            })
            .await;

        let report = tracking.report();
        assert!(report.any_degraded());
        assert_eq!(report.degradations[0].stage, "noise_filter");
    }

    #[tokio::test]
    async fn successful_call_is_not_recorded() {
        let mock = MockGateway::new();
        mock.push_classify(Ok(ClassifyResponse { classifications: vec![] }));
        let tracking = TrackingGateway::new(&mock);

        let _ = tracking
            .classify(ClassifyRequest {
                events: vec![],
                dom_context: vec![],
            })
            .await;

        assert!(!tracking.report().any_degraded());
    }
}

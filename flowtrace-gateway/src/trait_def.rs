//! The `Gateway` trait: the one seam where the analysis core and the
//! playback loop talk to an LLM (spec.md §6).

use crate::error::GatewayError;
use crate::schema::*;
use async_trait::async_trait;

/// A function set taking typed requests and returning typed JSON
/// responses. Every method may fail with [`GatewayError`]; callers are
/// expected to degrade to a heuristic fallback rather than propagate most
/// failures (spec.md §7, "LLM permanent").
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Classify heuristic-pass survivors as core/supporting/noise.
    async fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, GatewayError>;

    /// Validate temporally-assigned DOM→network correlations.
    async fn correlate_validate(
        &self,
        request: CorrelateValidateRequest,
    ) -> Result<CorrelateValidateResponse, GatewayError>;

    /// Name and type the varying parts discovered by cross-session diffing.
    async fn parameterize(
        &self,
        request: ParameterizeRequest,
    ) -> Result<ParameterizeResponse, GatewayError>;

    /// Validate candidate data-flow chains between steps.
    async fn validate_chains(
        &self,
        request: ValidateChainsRequest,
    ) -> Result<ValidateChainsResponse, GatewayError>;

    /// Refine the heuristically detected authentication pattern.
    async fn detect_auth(
        &self,
        request: DetectAuthRequest,
    ) -> Result<DetectAuthResponse, GatewayError>;

    /// Author the workflow's description and returns summary.
    async fn workflow_metadata(
        &self,
        request: WorkflowMetadataRequest,
    ) -> Result<WorkflowMetadataResponse, GatewayError>;

    /// Given a screenshot and page snapshot, decide the next playback
    /// action. `screenshot` is PNG bytes; multimodal providers receive it
    /// alongside the text prompt.
    async fn next_action(
        &self,
        screenshot: &[u8],
        request: NextActionRequest,
    ) -> Result<NextActionResponse, GatewayError>;

    /// Summarize a workflow's goal once per playback run.
    async fn intent(&self, request: IntentRequest) -> Result<IntentResponse, GatewayError>;
}

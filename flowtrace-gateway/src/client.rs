//! [`HttpGateway`]: a [`Gateway`] backed by an OpenAI-compatible chat
//! completions endpoint, with retry-with-backoff on transient failures.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::prompt::{parse_response, system_prompt};
use crate::schema::*;
use crate::trait_def::Gateway;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// A [`Gateway`] that talks to an OpenAI-compatible chat completions API.
/// Holds a lazily-reusable [`reqwest::Client`]; switching [`GatewayConfig`]
/// means constructing a new `HttpGateway` (spec.md §5, "shared resources").
pub struct HttpGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Build a gateway client from `config`.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn complete_text(
        &self,
        function_name: &str,
        user_prompt: String,
        image_png: Option<&[u8]>,
    ) -> Result<String, GatewayError> {
        retry_with_backoff(&self.config, || {
            self.complete_once(function_name, &user_prompt, image_png)
        })
        .await
    }

    async fn complete_once(
        &self,
        function_name: &str,
        user_prompt: &str,
        image_png: Option<&[u8]>,
    ) -> Result<String, GatewayError> {
        let user_content = match image_png {
            None => json!(user_prompt),
            Some(bytes) => {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                json!([
                    { "type": "text", "text": user_prompt },
                    { "type": "image_url", "image_url": { "url": format!("data:image/png;base64,{encoded}") } },
                ])
            }
        };
        let body = json!({
            "model": self.config.model_id(),
            "messages": [
                { "role": "system", "content": system_prompt(function_name) },
                { "role": "user", "content": user_content },
            ],
        });

        let response = self
            .http
            .post(self.config.base_url())
            .bearer_auth(self.config.bearer_token())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Transient(format!("{status}: {text}")));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Model(format!("{status}: {text}")));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Parse("missing choices[0].message.content".to_string()))
    }
}

/// Retry `op` up to `config.max_retries` times with exponential backoff
/// (base delay doubling each attempt), retrying only on
/// [`GatewayError::is_retryable`] errors — spec.md §5.
async fn retry_with_backoff<F, Fut, T>(config: &GatewayConfig, mut op: F) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, GatewayError>>,
{
    let mut attempt = 0;
    let mut delay = config.backoff_base_value();
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < config.max_retries_value() => {
                tracing::warn!(attempt, error = %err, "gateway call failed, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn to_prompt(request: &impl Serialize) -> Result<String, GatewayError> {
    serde_json::to_string_pretty(request)
        .map_err(|e| GatewayError::Other(Box::new(e) as Box<dyn std::error::Error + Send + Sync>))
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, GatewayError> {
        let prompt = to_prompt(&request)?;
        let text = self.complete_text("classify", prompt, None).await?;
        parse_response(&text)
    }

    async fn correlate_validate(
        &self,
        request: CorrelateValidateRequest,
    ) -> Result<CorrelateValidateResponse, GatewayError> {
        let prompt = to_prompt(&request)?;
        let text = self.complete_text("correlate-validate", prompt, None).await?;
        parse_response(&text)
    }

    async fn parameterize(
        &self,
        request: ParameterizeRequest,
    ) -> Result<ParameterizeResponse, GatewayError> {
        let prompt = to_prompt(&request)?;
        let text = self.complete_text("parameterize", prompt, None).await?;
        parse_response(&text)
    }

    async fn validate_chains(
        &self,
        request: ValidateChainsRequest,
    ) -> Result<ValidateChainsResponse, GatewayError> {
        let prompt = to_prompt(&request)?;
        let text = self.complete_text("validate-chains", prompt, None).await?;
        parse_response(&text)
    }

    async fn detect_auth(
        &self,
        request: DetectAuthRequest,
    ) -> Result<DetectAuthResponse, GatewayError> {
        let prompt = to_prompt(&request)?;
        let text = self.complete_text("detect-auth", prompt, None).await?;
        parse_response(&text)
    }

    async fn workflow_metadata(
        &self,
        request: WorkflowMetadataRequest,
    ) -> Result<WorkflowMetadataResponse, GatewayError> {
        let prompt = to_prompt(&request)?;
        let text = self.complete_text("workflow-metadata", prompt, None).await?;
        parse_response(&text)
    }

    async fn next_action(
        &self,
        screenshot: &[u8],
        request: NextActionRequest,
    ) -> Result<NextActionResponse, GatewayError> {
        let prompt = to_prompt(&request)?;
        let text = self
            .complete_text("next-action", prompt, Some(screenshot))
            .await?;
        parse_response(&text)
    }

    async fn intent(&self, request: IntentRequest) -> Result<IntentResponse, GatewayError> {
        let prompt = to_prompt(&request)?;
        let text = self.complete_text("intent", prompt, None).await?;
        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn retry_with_backoff_stops_after_max_retries() {
        let config = GatewayConfig::with_api_key("k")
            .max_retries(2)
            .backoff_base(Duration::from_millis(1));
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<(), GatewayError> = retry_with_backoff(&config, || {
            attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err(GatewayError::Transient("boom".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_with_backoff_does_not_retry_non_transient() {
        let config = GatewayConfig::with_api_key("k").max_retries(2);
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<(), GatewayError> = retry_with_backoff(&config, || {
            attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err(GatewayError::Model("bad request".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_with_backoff_returns_ok_once_retryable_error_clears() {
        let config = GatewayConfig::with_api_key("k")
            .max_retries(3)
            .backoff_base(Duration::from_millis(1));
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result = retry_with_backoff(&config, || {
            let n = attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(GatewayError::Transient("boom".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }
}

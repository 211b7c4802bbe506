//! Gateway configuration: credentials, model selection, retry bounds.

use crate::error::GatewayError;
use std::time::Duration;

/// Direct API key for the LLM provider.
pub const ENV_API_KEY: &str = "FLOWTRACE_LLM_API_KEY";
/// Proxy endpoint that authenticates on the core's behalf.
pub const ENV_PROXY_URL: &str = "FLOWTRACE_LLM_PROXY_URL";
/// Model identifier override.
pub const ENV_MODEL: &str = "FLOWTRACE_LLM_MODEL";

/// Default, vision-capable model used when no override is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default upper bound on transient-error retries (spec.md §5).
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Base backoff delay; doubles on each retry.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Where an [`HttpGateway`](crate::client::HttpGateway) sends requests.
#[derive(Debug, Clone)]
enum Endpoint {
    /// Direct provider API, authenticated with `api_key`.
    Direct { api_key: String },
    /// A proxy that supplies its own credential.
    Proxy { url: String },
}

/// Configuration for a gateway client: credential, model, retry bounds.
/// Built with the chained-option pattern, or read from the environment
/// with [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    endpoint: Endpoint,
    model: String,
    max_retries: u32,
    backoff_base: Duration,
}

impl GatewayConfig {
    /// Configure a direct connection authenticated with `api_key`.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Direct {
                api_key: api_key.into(),
            },
            model: DEFAULT_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }

    /// Configure a proxied connection; the proxy supplies its own
    /// credential on the core's behalf.
    pub fn with_proxy(proxy_url: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Proxy {
                url: proxy_url.into(),
            },
            model: DEFAULT_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }

    /// Build configuration from `FLOWTRACE_LLM_API_KEY` / `_PROXY_URL` /
    /// `_MODEL`. Proxy URL takes priority over a direct API key when both
    /// are set, matching the "proxy overrides the endpoint" rule in
    /// spec.md §6.
    pub fn from_env() -> Result<Self, GatewayError> {
        let model = std::env::var(ENV_MODEL).ok();
        let mut config = if let Ok(proxy) = std::env::var(ENV_PROXY_URL) {
            Self::with_proxy(proxy)
        } else if let Ok(key) = std::env::var(ENV_API_KEY) {
            Self::with_api_key(key)
        } else {
            return Err(GatewayError::CredentialMissing);
        };
        if let Some(model) = model {
            config = config.model(model);
        }
        Ok(config)
    }

    /// Override the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the maximum number of transient-error retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the base backoff delay (doubles per retry).
    pub fn backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub(crate) fn base_url(&self) -> &str {
        match &self.endpoint {
            Endpoint::Direct { .. } => "https://api.openai.com/v1/chat/completions",
            Endpoint::Proxy { url } => url.as_str(),
        }
    }

    pub(crate) fn bearer_token(&self) -> &str {
        match &self.endpoint {
            Endpoint::Direct { api_key } => api_key.as_str(),
            Endpoint::Proxy { .. } => "proxy-managed",
        }
    }

    pub(crate) fn model_id(&self) -> &str {
        &self.model
    }

    pub(crate) fn max_retries_value(&self) -> u32 {
        self.max_retries
    }

    pub(crate) fn backoff_base_value(&self) -> Duration {
        self.backoff_base
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct { .. } => f.debug_struct("Direct").field("api_key", &"[REDACTED]").finish(),
            Self::Proxy { url } => f.debug_struct("Proxy").field("url", url).finish(),
        }
    }
}

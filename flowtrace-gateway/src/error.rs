//! Errors produced by a [`crate::Gateway`] implementation.

use thiserror::Error;

/// Errors from a gateway call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No API key and no proxy URL configured. LLM-dependent stages fail
    /// fast with this rather than attempting a doomed request.
    #[error("no LLM credential configured: set FLOWTRACE_LLM_API_KEY or FLOWTRACE_LLM_PROXY_URL")]
    CredentialMissing,

    /// Rate-limited or the provider reported itself overloaded. Retryable.
    #[error("transient gateway failure: {0}")]
    Transient(String),

    /// The underlying HTTP call failed outright (connection reset, DNS).
    /// Retryable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The model's response couldn't be parsed as the expected JSON shape,
    /// even after stripping fenced code blocks. Not retryable — a repeat
    /// call is as likely to fail the same way.
    #[error("could not parse gateway response: {0}")]
    Parse(String),

    /// The model call completed but returned an error status unrelated to
    /// rate-limiting (bad request, auth failure, model error).
    #[error("model error: {0}")]
    Model(String),

    /// Any other gateway error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl GatewayError {
    /// Whether retrying the same request might succeed. Used by the
    /// retry-with-backoff wrapper in [`crate::client`] and by callers
    /// deciding whether to surface an error or degrade to a heuristic
    /// fallback.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Transport(_))
    }
}

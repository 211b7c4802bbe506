#![deny(missing_docs)]
//! Typed LLM gateway: the one boundary where the analysis core and the
//! intelligent-playback loop talk to a model.
//!
//! [`Gateway`] declares one async method per function named in spec.md §6
//! (classify, correlate-validate, parameterize, validate-chains,
//! detect-auth, workflow-metadata, next-action, intent), each with an
//! exact request/response schema in [`schema`]. [`HttpGateway`] is the
//! production implementation; [`mock::MockGateway`] is a scriptable
//! stand-in for tests.

mod client;
mod config;
mod error;
pub mod mock;
mod prompt;
pub mod schema;
mod trait_def;

pub use client::HttpGateway;
pub use config::{GatewayConfig, DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, ENV_API_KEY, ENV_MODEL, ENV_PROXY_URL};
pub use error::GatewayError;
pub use prompt::{extract_json, parse_response};
pub use trait_def::Gateway;

#[cfg(test)]
mod object_safety {
    use super::*;

    fn _assert_send_sync<T: Send + Sync + 'static>() {}

    #[test]
    fn gateway_trait_object_is_send_sync() {
        _assert_send_sync::<Box<dyn Gateway>>();
    }
}

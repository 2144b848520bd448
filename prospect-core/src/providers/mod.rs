//! Provider adapters: thin request/response shaping for each upstream
//! service, plus the connection-probe dispatcher used by
//! [`crate::api::ApiIntegrationManager::test_connection`].

pub mod exa;
pub mod openai;
pub mod perplexity;
pub mod signalhub;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::constants::services;

pub use exa::{ExaClient, ExaResult, ExaSearchResponse};
pub use openai::OpenAiClient;
pub use perplexity::PerplexityClient;
pub use signalhub::{BuyingSignal, SignalContact, SignalHubClient, SignalReport};

/// Failures raised by a single provider attempt. The integration manager
/// converts these into structured results; they never cross its boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("HTTP {status} {status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Parse(String),
    #[error("unsupported provider: {0}")]
    Unsupported(String),
}

/// Shape a non-2xx response into a [`ProviderError::Http`] carrying the
/// status, status text, and body.
pub(crate) async fn error_for_status(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Http {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("unknown").to_string(),
        body,
    }
}

/// A provider that can answer a minimal real request to verify
/// reachability and key validity.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    fn name(&self) -> &'static str;

    /// Issue the cheapest real request the provider supports.
    async fn probe(&self) -> Result<Value, ProviderError>;
}

fn probe_client(service: &str, api_key: &str) -> Result<Box<dyn ConnectionProbe>, ProviderError> {
    match service {
        services::EXA => Ok(Box::new(ExaClient::new(api_key.to_string()))),
        services::OPENAI => Ok(Box::new(OpenAiClient::new(api_key.to_string()))),
        services::PERPLEXITY => Ok(Box::new(PerplexityClient::new(api_key.to_string()))),
        services::SIGNALHUB => Ok(Box::new(SignalHubClient::new())),
        other => Err(ProviderError::Unsupported(other.to_string())),
    }
}

/// Dispatch a connection probe for the named service.
pub async fn probe(service: &str, api_key: &str) -> Result<Value, ProviderError> {
    probe_client(service, api_key)?.probe().await
}

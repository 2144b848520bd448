//! Perplexity health-check adapter: a lightweight model-listing call used
//! to validate reachability and key acceptance.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;

use super::{ConnectionProbe, ProviderError, error_for_status};
use crate::config::constants::{endpoints, services};

pub struct PerplexityClient {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
}

impl PerplexityClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, endpoints::PERPLEXITY_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            http_client: HttpClient::new(),
            base_url,
        }
    }

    /// List available models. Only reachability matters to callers, so the
    /// body is passed through untyped.
    pub async fn list_models(&self) -> Result<Value, ProviderError> {
        let response = self
            .http_client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|err| ProviderError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        response
            .json()
            .await
            .map_err(|err| ProviderError::Parse(err.to_string()))
    }
}

#[async_trait]
impl ConnectionProbe for PerplexityClient {
    fn name(&self) -> &'static str {
        services::PERPLEXITY
    }

    async fn probe(&self) -> Result<Value, ProviderError> {
        self.list_models().await
    }
}

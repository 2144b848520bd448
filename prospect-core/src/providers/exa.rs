//! Exa semantic-search adapter.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ConnectionProbe, ProviderError, error_for_status};
use crate::config::constants::{endpoints, services};

pub struct ExaClient {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    num_results: u32,
    #[serde(rename = "type")]
    search_type: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExaSearchResponse {
    pub results: Vec<ExaResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExaResult {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
}

impl ExaClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, endpoints::EXA_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            http_client: HttpClient::new(),
            base_url,
        }
    }

    /// Neural search for companies matching the query.
    pub async fn search(
        &self,
        query: &str,
        num_results: u32,
    ) -> Result<ExaSearchResponse, ProviderError> {
        let request = ExaSearchRequest {
            query,
            num_results,
            search_type: "neural",
        };

        let response = self
            .http_client
            .post(format!("{}/search", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&request)
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
impl ConnectionProbe for ExaClient {
    fn name(&self) -> &'static str {
        services::EXA
    }

    async fn probe(&self) -> Result<Value, ProviderError> {
        let response = self.search("sales intelligence platforms", 1).await?;
        serde_json::to_value(response).map_err(|err| ProviderError::Parse(err.to_string()))
    }
}

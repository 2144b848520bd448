//! OpenAI contact-enrichment adapter.
//!
//! Shapes chat-completion requests the way the upstream API expects and
//! pulls the first choice's message content out of the response.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{Value, json};

use super::{ConnectionProbe, ProviderError, error_for_status};
use crate::config::constants::{ENRICHMENT_MODEL, endpoints, services};

const ENRICHMENT_SYSTEM_PROMPT: &str = "You are a sales research assistant. Given a contact's \
     name and company, produce a short enrichment summary: likely role scope, talking points, \
     and one suggested opener. Be concise and factual.";

pub struct OpenAiClient {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, endpoints::OPENAI_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            http_client: HttpClient::new(),
            base_url,
            model: ENRICHMENT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    async fn chat_completion(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Value, ProviderError> {
        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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

    /// Generate an enrichment summary for a contact at a company.
    pub async fn enrich_contact(
        &self,
        name: &str,
        company: &str,
    ) -> Result<String, ProviderError> {
        let user_prompt = format!("Contact: {name}\nCompany: {company}");
        let response = self
            .chat_completion(ENRICHMENT_SYSTEM_PROMPT, &user_prompt, 300, 0.3)
            .await?;

        response
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|content| content.to_string())
            .ok_or_else(|| ProviderError::Parse("missing choices[0].message.content".to_string()))
    }
}

#[async_trait]
impl ConnectionProbe for OpenAiClient {
    fn name(&self) -> &'static str {
        services::OPENAI
    }

    async fn probe(&self) -> Result<Value, ProviderError> {
        self.chat_completion("You are a connectivity check.", "Reply with OK.", 5, 0.0)
            .await
    }
}

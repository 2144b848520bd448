//! Configuration for the provider gateway.
//!
//! Everything is driven by `prospect.toml` with serde defaults, so a missing
//! file or a partial file both yield a working configuration. The rate-limit
//! table is passed to [`crate::api::ApiIntegrationManager::new`] at
//! construction time; there is no module-level singleton.

pub mod api_keys;
pub mod constants;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use constants::{ENRICHMENT_MODEL, endpoints, services};

/// Static quota configuration for one service.
///
/// Both ceilings are positive request counts; `cost_per_request` is the
/// nominal spend recorded against the ledger on every successful call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_minute: usize,
    pub requests_per_hour: usize,
    pub cost_per_request: f64,
}

impl RateLimitConfig {
    fn validate(&self, service: &str) -> Result<()> {
        if self.requests_per_minute == 0 || self.requests_per_hour == 0 {
            bail!("rate limit for {service}: ceilings must be positive");
        }
        if self.cost_per_request < 0.0 {
            bail!("rate limit for {service}: cost_per_request must be non-negative");
        }
        Ok(())
    }
}

/// Base URLs and model selection for the provider adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub exa: String,
    pub openai: String,
    pub perplexity: String,
    pub enrichment_model: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            exa: endpoints::EXA_BASE_URL.to_string(),
            openai: endpoints::OPENAI_BASE_URL.to_string(),
            perplexity: endpoints::PERPLEXITY_BASE_URL.to_string(),
            enrichment_model: ENRICHMENT_MODEL.to_string(),
        }
    }
}

/// Top-level configuration loaded from `prospect.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProspectConfig {
    pub rate_limits: HashMap<String, RateLimitConfig>,
    pub endpoints: EndpointConfig,
}

impl Default for ProspectConfig {
    fn default() -> Self {
        Self {
            rate_limits: default_rate_limits(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl ProspectConfig {
    /// Load configuration from the given TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("invalid TOML in {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Check the quota-table invariants: positive ceilings, non-negative
    /// cost.
    pub fn validate(&self) -> Result<()> {
        for (service, limit) in &self.rate_limits {
            limit.validate(service)?;
        }
        Ok(())
    }

    /// Load `prospect.toml` from the current directory, falling back to the
    /// built-in defaults when the file does not exist.
    pub fn load_or_default() -> Result<Self> {
        let path = Path::new("prospect.toml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Built-in quota table for the real providers.
///
/// SignalHub is deliberately absent: services without a declared quota are
/// admitted without governance (default-open).
pub fn default_rate_limits() -> HashMap<String, RateLimitConfig> {
    let mut limits = HashMap::new();
    limits.insert(
        services::EXA.to_string(),
        RateLimitConfig {
            requests_per_minute: 60,
            requests_per_hour: 1000,
            cost_per_request: 0.01,
        },
    );
    limits.insert(
        services::OPENAI.to_string(),
        RateLimitConfig {
            requests_per_minute: 60,
            requests_per_hour: 3000,
            cost_per_request: 0.002,
        },
    );
    limits.insert(
        services::PERPLEXITY.to_string(),
        RateLimitConfig {
            requests_per_minute: 20,
            requests_per_hour: 600,
            cost_per_request: 0.005,
        },
    );
    limits
}

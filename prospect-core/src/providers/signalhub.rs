//! Simulated SignalHub provider.
//!
//! Stands in for a buying-signal feed that has no public API: there is no
//! HTTP call, only a fixed artificial delay followed by synthetic signal and
//! contact data. Runs through the integration manager like any other
//! provider so governance paths stay exercised end to end.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{ConnectionProbe, ProviderError};
use crate::config::constants::{defaults, services};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyingSignal {
    pub kind: String,
    pub detail: String,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalContact {
    pub name: String,
    pub title: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReport {
    pub company: String,
    pub signals: Vec<BuyingSignal>,
    pub contacts: Vec<SignalContact>,
}

pub struct SignalHubClient {
    latency: Duration,
}

impl Default for SignalHubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalHubClient {
    pub fn new() -> Self {
        Self {
            latency: defaults::SIGNALHUB_LATENCY,
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    /// Return synthetic buying signals and suggested contacts for a company
    /// after the simulated round-trip delay.
    pub async fn fetch_signals(&self, company: &str) -> Result<SignalReport, ProviderError> {
        tokio::time::sleep(self.latency).await;

        Ok(SignalReport {
            company: company.to_string(),
            signals: vec![
                BuyingSignal {
                    kind: "hiring".to_string(),
                    detail: format!("{company} posted 3 revenue-operations openings this month"),
                    strength: 0.8,
                },
                BuyingSignal {
                    kind: "funding".to_string(),
                    detail: format!("{company} announced a Series B round"),
                    strength: 0.6,
                },
                BuyingSignal {
                    kind: "tech-stack".to_string(),
                    detail: "CRM migration detected from job descriptions".to_string(),
                    strength: 0.4,
                },
            ],
            contacts: vec![
                SignalContact {
                    name: "Jordan Reyes".to_string(),
                    title: "VP Revenue Operations".to_string(),
                    confidence: 0.9,
                },
                SignalContact {
                    name: "Sam Okafor".to_string(),
                    title: "Head of Sales Enablement".to_string(),
                    confidence: 0.7,
                },
            ],
        })
    }
}

#[async_trait]
impl ConnectionProbe for SignalHubClient {
    fn name(&self) -> &'static str {
        services::SIGNALHUB
    }

    async fn probe(&self) -> Result<Value, ProviderError> {
        let report = self.fetch_signals("probe").await?;
        serde_json::to_value(report).map_err(|err| ProviderError::Parse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn resolves_after_fixed_delay_with_synthetic_data() {
        let client = SignalHubClient::with_latency(Duration::from_millis(500));
        let started = Instant::now();

        let report = client
            .fetch_signals("Acme Corp")
            .await
            .expect("simulated fetch cannot fail");

        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(report.company, "Acme Corp");
        assert!(!report.signals.is_empty());
        assert!(!report.contacts.is_empty());
        assert!(report.signals[0].detail.contains("Acme Corp"));
    }
}

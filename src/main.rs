use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use prospect_core::api::{ApiIntegrationManager, ApiResponse, CallOptions};
use prospect_core::config::constants::services;
use prospect_core::config::{ProspectConfig, api_keys};
use prospect_core::providers::{ExaClient, OpenAiClient, SignalHubClient};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "prospect",
    version,
    about = "Sales-intelligence provider gateway with rate limiting, circuit breaking, and response caching"
)]
struct Cli {
    /// Path to a prospect.toml config file; defaults to ./prospect.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Semantic company search through the Exa provider
    Search {
        query: Vec<String>,
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },

    /// Draft a contact-enrichment summary through the OpenAI provider
    Enrich { name: String, company: String },

    /// Fetch simulated buying signals for a company
    Signals { company: String },

    /// Validate an API key format and probe the provider
    Test {
        service: String,
        /// Key to test; defaults to the provider's environment variable
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show circuit, quota, and cache state for every provider
    Status,

    /// Drop cached responses (for one service, or all)
    ClearCache { service: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    api_keys::load_dotenv()?;

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ProspectConfig::load(path)?,
        None => ProspectConfig::load_or_default()?,
    };
    let manager = ApiIntegrationManager::new(config.rate_limits.clone());

    match cli.command {
        Commands::Search { query, limit } => {
            if query.is_empty() {
                bail!("search requires a query");
            }
            let query = query.join(" ");
            let api_key = api_keys::get_api_key(services::EXA)?;
            let client = ExaClient::with_base_url(api_key, config.endpoints.exa.clone());
            let params = json!({ "query": query, "limit": limit });

            let response = manager
                .execute(
                    services::EXA,
                    || client.search(&query, limit),
                    &params,
                    CallOptions::default(),
                )
                .await;
            print_response(response)
        }
        Commands::Enrich { name, company } => {
            let api_key = api_keys::get_api_key(services::OPENAI)?;
            let client = OpenAiClient::with_base_url(api_key, config.endpoints.openai.clone())
                .with_model(config.endpoints.enrichment_model.clone());
            let params = json!({ "name": name, "company": company });

            let response = manager
                .execute(
                    services::OPENAI,
                    || client.enrich_contact(&name, &company),
                    &params,
                    CallOptions::default(),
                )
                .await;
            print_response(response)
        }
        Commands::Signals { company } => {
            let client = SignalHubClient::new();
            let params = json!({ "company": company });

            let response = manager
                .execute(
                    services::SIGNALHUB,
                    || client.fetch_signals(&company),
                    &params,
                    CallOptions::default(),
                )
                .await;
            print_response(response)
        }
        Commands::Test { service, api_key } => {
            let api_key = match api_key {
                Some(key) => key,
                None => api_keys::get_api_key(&service)
                    .with_context(|| format!("pass --api-key to test {service} directly"))?,
            };

            let result = manager.test_connection(&service, &api_key).await;
            if result.success {
                println!(
                    "{}: connection ok ({} ms)",
                    result.service,
                    result.latency.as_millis()
                );
                Ok(())
            } else {
                bail!(
                    "{}: connection failed: {}",
                    result.service,
                    result.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
        }
        Commands::Status => {
            let status = manager.status();
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Commands::ClearCache { service } => {
            manager.clear_cache(service.as_deref());
            match service {
                Some(service) => println!("cache cleared for {service}"),
                None => println!("cache cleared"),
            }
            Ok(())
        }
    }
}

fn print_response<T: Serialize>(response: ApiResponse<T>) -> Result<()> {
    if response.success {
        if let Some(data) = &response.data {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        tracing::debug!(
            elapsed_ms = response.meta.elapsed.as_millis() as u64,
            retries = response.meta.retries,
            cache_hit = response.meta.cache_hit,
            "request completed"
        );
        Ok(())
    } else {
        bail!(
            "{}",
            response.error.unwrap_or_else(|| "unknown error".to_string())
        )
    }
}

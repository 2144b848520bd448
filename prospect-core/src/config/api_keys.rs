//! API key retrieval and local format validation.
//!
//! Keys are resolved environment-first (with `.env` support via `dotenvy`),
//! and validated locally before any network call so that an obviously
//! malformed key never consumes quota.

use anyhow::{Result, anyhow};
use std::env;
use thiserror::Error;

use super::constants::services;

/// A key that failed the local format heuristics.
#[derive(Debug, Error)]
#[error("invalid API key for {service}: {reason}")]
pub struct KeyFormatError {
    pub service: String,
    pub reason: String,
}

/// Minimum length applied to keys for services without a known prefix.
const MIN_KEY_LEN: usize = 10;

/// Environment variable holding the API key for a service, if one exists.
pub fn env_var_for(service: &str) -> Option<&'static str> {
    match service {
        services::EXA => Some("EXA_API_KEY"),
        services::OPENAI => Some("OPENAI_API_KEY"),
        services::PERPLEXITY => Some("PERPLEXITY_API_KEY"),
        _ => None,
    }
}

/// Load environment variables from a `.env` file in the current directory.
///
/// A missing file is not an error; any other failure is reported but does
/// not abort startup.
pub fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded environment from .env");
            Ok(())
        }
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load .env file");
            Ok(())
        }
    }
}

/// Retrieve the API key for a service from the environment.
pub fn get_api_key(service: &str) -> Result<String> {
    let var = env_var_for(service)
        .ok_or_else(|| anyhow!("no API key variable known for provider '{service}'"))?;

    match env::var(var) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(anyhow!(
            "no API key found for {service}. Set {var} in the environment or in .env"
        )),
    }
}

/// Validate a key's shape for a service without touching the network.
///
/// Heuristics per provider: Exa keys start with `exa_`, OpenAI keys with
/// `sk-`, Perplexity keys with `pplx-`; each has a minimum length. Unknown
/// services only get the length check.
pub fn validate_key_format(service: &str, key: &str) -> Result<(), KeyFormatError> {
    let fail = |reason: String| {
        Err(KeyFormatError {
            service: service.to_string(),
            reason,
        })
    };

    if key.is_empty() {
        return fail("key is empty".to_string());
    }

    let (prefix, min_len) = match service {
        services::EXA => (Some("exa_"), 16),
        services::OPENAI => (Some("sk-"), 20),
        services::PERPLEXITY => (Some("pplx-"), 20),
        _ => (None, MIN_KEY_LEN),
    };

    if let Some(prefix) = prefix {
        if !key.starts_with(prefix) {
            return fail(format!("expected prefix '{prefix}'"));
        }
    }

    if key.len() < min_len {
        return fail(format!("expected at least {min_len} characters"));
    }

    Ok(())
}

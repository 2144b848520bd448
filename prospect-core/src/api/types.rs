//! Result and option types crossing the integration-manager boundary.

use serde::Serialize;
use std::time::Duration;

use crate::api::circuit_breaker::CircuitState;
use crate::config::constants::defaults;

/// Per-call execution options for [`crate::api::ApiIntegrationManager::execute`].
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Consult and populate the response cache.
    pub use_cache: bool,
    /// Time-to-live for a cached success.
    pub cache_ttl: Duration,
    /// Retries after the first attempt.
    pub retry_count: u32,
    /// Per-attempt timeout; a slower attempt is abandoned and counted as a
    /// failure.
    pub timeout: Duration,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            cache_ttl: defaults::CACHE_TTL,
            retry_count: defaults::RETRY_COUNT,
            timeout: defaults::CALL_TIMEOUT,
        }
    }
}

/// Quota snapshot attached to successful responses.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitInfo {
    /// Display-only rolling value (`100 - count mod 100`); not derived from
    /// the configured ceilings and not a true remaining-capacity figure.
    pub remaining: u64,
    /// Seconds until the display window rolls over.
    pub reset_in_secs: u64,
    /// Accumulated nominal spend for the service.
    pub total_cost: f64,
}

/// Execution metadata carried by every response.
#[derive(Debug, Clone, Serialize)]
pub struct CallMetadata {
    pub elapsed: Duration,
    /// Retries performed beyond the first attempt.
    pub retries: u32,
    pub cache_hit: bool,
}

/// Structured result of a governed call.
///
/// Failures are values, not panics or propagated errors: callers branch on
/// [`ApiResponse::success`] rather than unwinding past the manager.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub rate_limit: Option<RateLimitInfo>,
    pub meta: CallMetadata,
}

impl<T> ApiResponse<T> {
    pub(crate) fn ok(data: T, rate_limit: Option<RateLimitInfo>, meta: CallMetadata) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            rate_limit,
            meta,
        }
    }

    pub(crate) fn failure(error: impl Into<String>, meta: CallMetadata) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            rate_limit: None,
            meta,
        }
    }
}

/// Outcome of a key validation + provider probe.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionTest {
    pub service: String,
    pub success: bool,
    pub latency: Duration,
    pub response: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Governance and quota state for one service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub circuit: CircuitState,
    pub total_cost: f64,
    pub request_count: usize,
    pub cached_entries: usize,
}

/// Snapshot returned by [`crate::api::ApiIntegrationManager::status`].
#[derive(Debug, Clone, Serialize)]
pub struct ApiStatus {
    pub services: Vec<ServiceStatus>,
    pub cache_size: usize,
}

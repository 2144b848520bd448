//! The API integration manager: a single instance owning the rate limiter,
//! circuit breaker, and response cache, through which every upstream call is
//! funneled.
//!
//! Call order for [`ApiIntegrationManager::execute`]: cache lookup, circuit
//! check, quota check, then a bounded attempt loop with per-attempt timeout
//! and exponential backoff. Breaker and limiter state mutate only on real
//! attempts — cache hits and governance denials leave them untouched.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::api::cache::ResponseCache;
use crate::api::circuit_breaker::CircuitBreaker;
use crate::api::rate_limiter::{RateLimitDecision, RateLimiter};
use crate::api::types::{
    ApiResponse, ApiStatus, CallMetadata, CallOptions, ConnectionTest, RateLimitInfo,
    ServiceStatus,
};
use crate::config::constants::{defaults, services};
use crate::config::{RateLimitConfig, api_keys, default_rate_limits};
use crate::providers::{self, ProviderError};

pub struct ApiIntegrationManager {
    rate_limiter: RateLimiter,
    circuit_breaker: CircuitBreaker,
    cache: ResponseCache,
    limits: HashMap<String, RateLimitConfig>,
}

impl ApiIntegrationManager {
    /// Build a manager governed by the given quota table.
    pub fn new(limits: HashMap<String, RateLimitConfig>) -> Self {
        Self {
            rate_limiter: RateLimiter::new(limits.clone()),
            circuit_breaker: CircuitBreaker::new(),
            cache: ResponseCache::new(),
            limits,
        }
    }

    /// Manager with the built-in quota table.
    pub fn with_defaults() -> Self {
        Self::new(default_rate_limits())
    }

    /// Execute `operation` against `service` under full governance.
    ///
    /// `params` is only used for cache keying; callers pass the canonical
    /// parameter object for the call. The operation is invoked up to
    /// `retry_count + 1` times, each attempt raced against
    /// `options.timeout`, with `2^attempt` seconds of backoff between
    /// attempts.
    pub async fn execute<T, F, Fut>(
        &self,
        service: &str,
        operation: F,
        params: &Value,
        options: CallOptions,
    ) -> ApiResponse<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let started = Instant::now();
        let cache_key = ResponseCache::key(service, params);

        if options.use_cache {
            if let Some(value) = self.cache.get(&cache_key) {
                match serde_json::from_value::<T>(value) {
                    Ok(data) => {
                        tracing::debug!(service, key = %cache_key, "cache hit");
                        return ApiResponse::ok(
                            data,
                            None,
                            CallMetadata {
                                elapsed: started.elapsed(),
                                retries: 0,
                                cache_hit: true,
                            },
                        );
                    }
                    Err(err) => {
                        // Entry was cached under a different payload shape;
                        // fall through and refetch.
                        tracing::debug!(service, error = %err, "discarding unreadable cache entry");
                    }
                }
            }
        }

        if !self.circuit_breaker.can_execute(service) {
            tracing::warn!(service, "request rejected: circuit open");
            return ApiResponse::failure(
                format!("circuit breaker open for {service}: too many recent failures"),
                CallMetadata {
                    elapsed: started.elapsed(),
                    retries: 0,
                    cache_hit: false,
                },
            );
        }

        if let RateLimitDecision::Limited { retry_after } = self.rate_limiter.check(service) {
            let wait = round_up_to_seconds(retry_after);
            tracing::warn!(service, wait = %humantime::format_duration(wait), "request rejected: rate limited");
            return ApiResponse::failure(
                format!(
                    "rate limit exceeded for {service}: retry in {}",
                    humantime::format_duration(wait)
                ),
                CallMetadata {
                    elapsed: started.elapsed(),
                    retries: 0,
                    cache_hit: false,
                },
            );
        }

        let mut last_error = String::from("no attempt made");
        for attempt in 0..=options.retry_count {
            match tokio::time::timeout(options.timeout, operation()).await {
                Ok(Ok(data)) => {
                    self.circuit_breaker.record_success(service);
                    let cost = self
                        .limits
                        .get(service)
                        .map_or(0.0, |limit| limit.cost_per_request);
                    self.rate_limiter.record(service, cost);

                    if options.use_cache {
                        match serde_json::to_value(&data) {
                            Ok(value) => self.cache.set(&cache_key, value, options.cache_ttl),
                            Err(err) => {
                                tracing::debug!(service, error = %err, "response not cacheable")
                            }
                        }
                    }

                    let info = self.rate_limiter.cost_info(service);
                    let rate_limit = RateLimitInfo {
                        remaining: 100 - (info.request_count as u64 % 100),
                        reset_in_secs: 60,
                        total_cost: info.total_cost,
                    };

                    return ApiResponse::ok(
                        data,
                        Some(rate_limit),
                        CallMetadata {
                            elapsed: started.elapsed(),
                            retries: attempt,
                            cache_hit: false,
                        },
                    );
                }
                Ok(Err(err)) => {
                    last_error = err.to_string();
                    self.circuit_breaker.record_failure(service);
                    tracing::warn!(
                        service,
                        attempt = attempt + 1,
                        error = %last_error,
                        "attempt failed"
                    );
                }
                Err(_) => {
                    last_error = format!(
                        "timed out after {}",
                        humantime::format_duration(options.timeout)
                    );
                    self.circuit_breaker.record_failure(service);
                    tracing::warn!(service, attempt = attempt + 1, "attempt timed out");
                }
            }

            if attempt < options.retry_count {
                let backoff = Duration::from_secs(2u64.pow(attempt));
                tracing::debug!(service, backoff = %humantime::format_duration(backoff), "backing off before retry");
                tokio::time::sleep(backoff).await;
            }
        }

        let attempts = options.retry_count + 1;
        ApiResponse::failure(
            format!("{service} request failed after {attempts} attempts: {last_error}"),
            CallMetadata {
                elapsed: started.elapsed(),
                retries: options.retry_count,
                cache_hit: false,
            },
        )
    }

    /// Validate an API key locally, then probe the provider with a minimal
    /// real request (caching disabled, one retry, short timeout).
    ///
    /// A malformed key is rejected before any network call and consumes no
    /// quota.
    pub async fn test_connection(&self, service: &str, api_key: &str) -> ConnectionTest {
        let started = Instant::now();

        if let Err(err) = api_keys::validate_key_format(service, api_key) {
            return ConnectionTest {
                service: service.to_string(),
                success: false,
                latency: started.elapsed(),
                response: None,
                error: Some(err.to_string()),
            };
        }

        let options = CallOptions {
            use_cache: false,
            retry_count: 1,
            timeout: defaults::PROBE_TIMEOUT,
            ..CallOptions::default()
        };
        let params = json!({ "probe": service });

        let response: ApiResponse<Value> = self
            .execute(
                service,
                || providers::probe(service, api_key),
                &params,
                options,
            )
            .await;

        ConnectionTest {
            service: service.to_string(),
            success: response.success,
            latency: started.elapsed(),
            response: response.data,
            error: response.error,
        }
    }

    /// Read-only governance snapshot across all known services: the
    /// built-in providers plus any extra services in the quota table.
    pub fn status(&self) -> ApiStatus {
        let mut names: Vec<String> = services::ALL.iter().map(|s| s.to_string()).collect();
        let mut extras: Vec<String> = self
            .limits
            .keys()
            .filter(|name| !services::ALL.contains(&name.as_str()))
            .cloned()
            .collect();
        extras.sort();
        names.extend(extras);

        let services = names
            .into_iter()
            .map(|service| {
                let info = self.rate_limiter.cost_info(&service);
                ServiceStatus {
                    circuit: self.circuit_breaker.state(&service),
                    total_cost: info.total_cost,
                    request_count: info.request_count,
                    cached_entries: self.cache.count_prefix(&format!("{service}:")),
                    service,
                }
            })
            .collect();

        ApiStatus {
            services,
            cache_size: self.cache.len(),
        }
    }

    /// Drop cached responses for one service, or everything when `service`
    /// is `None`.
    pub fn clear_cache(&self, service: Option<&str>) {
        match service {
            Some(service) => self.cache.clear_prefix(&format!("{service}:")),
            None => self.cache.clear(),
        }
    }
}

/// Round a wait duration up to whole seconds for display.
fn round_up_to_seconds(duration: Duration) -> Duration {
    if duration.subsec_nanos() > 0 {
        Duration::from_secs(duration.as_secs() + 1)
    } else {
        duration
    }
}

//! Sliding-window rate limiter with per-service quotas and cost accounting.
//!
//! Checks are split from records: `check` prunes the trailing-hour window and
//! evaluates the ceilings without appending, `record` appends without
//! checking. The manager always checks before recording; the narrow race
//! between the two under concurrent callers is an accepted simplification,
//! not exact quota enforcement.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::RateLimitConfig;

const HOUR: Duration = Duration::from_secs(3600);
const MINUTE: Duration = Duration::from_secs(60);

/// Outcome of a quota check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// Denied; `retry_after` estimates when the oldest blocking request
    /// leaves its window.
    Limited { retry_after: Duration },
}

/// Accumulated spend for one service.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CostInfo {
    pub total_cost: f64,
    pub request_count: usize,
}

#[derive(Debug, Default)]
struct Ledger {
    requests: Vec<Instant>,
    total_cost: f64,
}

/// Tracks request timestamps and cost per service against a static quota
/// table. Services absent from the table are admitted without governance.
#[derive(Debug)]
pub struct RateLimiter {
    limits: HashMap<String, RateLimitConfig>,
    ledgers: Mutex<HashMap<String, Ledger>>,
}

impl RateLimiter {
    pub fn new(limits: HashMap<String, RateLimitConfig>) -> Self {
        Self {
            limits,
            ledgers: Mutex::new(HashMap::new()),
        }
    }

    /// Evaluate the hourly ceiling, then the per-minute ceiling, against the
    /// pruned ledger. Never appends to the ledger.
    pub fn check(&self, service: &str) -> RateLimitDecision {
        let Some(limit) = self.limits.get(service) else {
            // Default-open: no declared quota means no governance.
            return RateLimitDecision::Allowed;
        };

        let mut ledgers = self.ledgers.lock();
        let ledger = ledgers.entry(service.to_string()).or_default();
        let now = Instant::now();

        ledger.requests.retain(|&t| now.duration_since(t) < HOUR);

        if ledger.requests.len() >= limit.requests_per_hour {
            // An empty window can still hit a zero ceiling; deny for the
            // full window in that case.
            let retry_after = ledger.requests.first().map_or(HOUR, |&oldest| {
                HOUR.saturating_sub(now.duration_since(oldest))
            });
            tracing::debug!(service, ?retry_after, "hourly rate limit reached");
            return RateLimitDecision::Limited { retry_after };
        }

        let minute_window: Vec<Instant> = ledger
            .requests
            .iter()
            .copied()
            .filter(|&t| now.duration_since(t) < MINUTE)
            .collect();

        if minute_window.len() >= limit.requests_per_minute {
            let retry_after = minute_window.first().map_or(MINUTE, |&oldest| {
                MINUTE.saturating_sub(now.duration_since(oldest))
            });
            tracing::debug!(service, ?retry_after, "per-minute rate limit reached");
            return RateLimitDecision::Limited { retry_after };
        }

        RateLimitDecision::Allowed
    }

    /// Append a request at the current instant and add `cost` to the running
    /// total. Does not re-check the ceilings.
    pub fn record(&self, service: &str, cost: f64) {
        let mut ledgers = self.ledgers.lock();
        let ledger = ledgers.entry(service.to_string()).or_default();
        ledger.requests.push(Instant::now());
        ledger.total_cost += cost;
    }

    pub fn cost_info(&self, service: &str) -> CostInfo {
        let ledgers = self.ledgers.lock();
        match ledgers.get(service) {
            Some(ledger) => CostInfo {
                total_cost: ledger.total_cost,
                request_count: ledger.requests.len(),
            },
            None => CostInfo {
                total_cost: 0.0,
                request_count: 0,
            },
        }
    }
}

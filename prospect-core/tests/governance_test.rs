//! End-to-end governance behavior through the integration manager: caching,
//! retry exhaustion with backoff, circuit opening, and rate-limit denials.
//! All timing runs on tokio's paused clock.

use prospect_core::api::{ApiIntegrationManager, ApiResponse, CallOptions};
use prospect_core::config::RateLimitConfig;
use prospect_core::providers::ProviderError;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

fn manager_with(service: &str, per_minute: usize, per_hour: usize) -> ApiIntegrationManager {
    let mut limits = HashMap::new();
    limits.insert(
        service.to_string(),
        RateLimitConfig {
            requests_per_minute: per_minute,
            requests_per_hour: per_hour,
            cost_per_request: 0.01,
        },
    );
    ApiIntegrationManager::new(limits)
}

fn counting_ok(calls: &Arc<AtomicUsize>) -> impl Fn() -> ReadyOk {
    let calls = Arc::clone(calls);
    move || {
        let calls = Arc::clone(&calls);
        ReadyOk { calls }
    }
}

struct ReadyOk {
    calls: Arc<AtomicUsize>,
}

impl std::future::Future for ReadyOk {
    type Output = Result<Value, ProviderError>;

    fn poll(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::task::Poll::Ready(Ok(json!({"v": 1})))
    }
}

#[tokio::test(start_paused = true)]
async fn cache_hit_skips_second_invocation() {
    let manager = manager_with("exa", 100, 1000);
    let calls = Arc::new(AtomicUsize::new(0));
    let params = json!({"query": "crm vendors", "limit": 5});

    let first: ApiResponse<Value> = manager
        .execute("exa", counting_ok(&calls), &params, CallOptions::default())
        .await;
    assert!(first.success);
    assert!(!first.meta.cache_hit);

    let second: ApiResponse<Value> = manager
        .execute("exa", counting_ok(&calls), &params, CallOptions::default())
        .await;
    assert!(second.success);
    assert!(second.meta.cache_hit);
    assert_eq!(second.meta.retries, 0);
    assert_eq!(second.data, Some(json!({"v": 1})));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cached_entry_expires_with_ttl() {
    let manager = manager_with("exa", 100, 1000);
    let calls = Arc::new(AtomicUsize::new(0));
    let params = json!({"query": "crm vendors"});
    let options = CallOptions {
        cache_ttl: Duration::from_secs(5),
        ..CallOptions::default()
    };

    let _: ApiResponse<Value> = manager
        .execute("exa", counting_ok(&calls), &params, options.clone())
        .await;

    tokio::time::advance(Duration::from_secs(6)).await;

    let refetched: ApiResponse<Value> = manager
        .execute("exa", counting_ok(&calls), &params, options)
        .await;
    assert!(refetched.success);
    assert!(!refetched.meta.cache_hit);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_attempt_exactly_retry_count_plus_one_times() {
    let manager = manager_with("exa", 100, 1000);
    let calls = Arc::new(AtomicUsize::new(0));
    let op_calls = Arc::clone(&calls);
    let started = Instant::now();

    let response: ApiResponse<Value> = manager
        .execute(
            "exa",
            move || {
                let calls = Arc::clone(&op_calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<Value, _>(ProviderError::Network("connection refused".to_string()))
                }
            },
            &json!({"query": "q"}),
            CallOptions {
                retry_count: 2,
                ..CallOptions::default()
            },
        )
        .await;

    assert!(!response.success);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(response.meta.retries, 2);
    let error = response.error.unwrap_or_default();
    assert!(error.contains("3 attempts"), "unexpected error: {error}");
    assert!(error.contains("connection refused"));

    // Backoff between attempts follows 2^attempt seconds: 1s + 2s.
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn circuit_opens_after_five_exhausting_calls_and_short_circuits_the_sixth() {
    let manager = manager_with("y", 1000, 10000);
    let calls = Arc::new(AtomicUsize::new(0));
    let options = CallOptions {
        retry_count: 0,
        use_cache: false,
        ..CallOptions::default()
    };

    for _ in 0..5 {
        let op_calls = Arc::clone(&calls);
        let response: ApiResponse<Value> = manager
            .execute(
                "y",
                move || {
                    let calls = Arc::clone(&op_calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<Value, _>(ProviderError::Network("boom".to_string()))
                    }
                },
                &json!({}),
                options.clone(),
            )
            .await;
        assert!(!response.success);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 5);

    let op_calls = Arc::clone(&calls);
    let sixth: ApiResponse<Value> = manager
        .execute(
            "y",
            move || {
                let calls = Arc::clone(&op_calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({}))
                }
            },
            &json!({}),
            options,
        )
        .await;

    assert!(!sixth.success);
    let error = sixth.error.unwrap_or_default();
    assert!(error.contains("circuit"), "unexpected error: {error}");
    // The operation was never invoked.
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_denial_consumes_no_attempt() {
    let manager = manager_with("x", 2, 1000);
    let calls = Arc::new(AtomicUsize::new(0));

    for i in 0..2 {
        let response: ApiResponse<Value> = manager
            .execute(
                "x",
                counting_ok(&calls),
                &json!({"i": i}),
                CallOptions::default(),
            )
            .await;
        assert!(response.success, "request {i} should pass governance");
    }

    let denied: ApiResponse<Value> = manager
        .execute(
            "x",
            counting_ok(&calls),
            &json!({"i": 2}),
            CallOptions::default(),
        )
        .await;

    assert!(!denied.success);
    let error = denied.error.unwrap_or_default();
    assert!(error.contains("rate limit"), "unexpected error: {error}");
    assert!(error.contains("retry in"), "unexpected error: {error}");
    assert_eq!(denied.meta.retries, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn timeout_counts_as_a_failed_attempt() {
    let manager = manager_with("exa", 100, 1000);

    let response: ApiResponse<Value> = manager
        .execute(
            "exa",
            || async {
                tokio::time::sleep(Duration::from_secs(120)).await;
                Ok(json!({}))
            },
            &json!({"slow": true}),
            CallOptions {
                retry_count: 0,
                timeout: Duration::from_secs(1),
                ..CallOptions::default()
            },
        )
        .await;

    assert!(!response.success);
    let error = response.error.unwrap_or_default();
    assert!(error.contains("timed out"), "unexpected error: {error}");
}

#[tokio::test(start_paused = true)]
async fn success_reports_rate_limit_snapshot_and_metadata() {
    let manager = manager_with("exa", 100, 1000);
    let calls = Arc::new(AtomicUsize::new(0));

    let response: ApiResponse<Value> = manager
        .execute(
            "exa",
            counting_ok(&calls),
            &json!({"q": 1}),
            CallOptions::default(),
        )
        .await;

    assert!(response.success);
    assert!(!response.meta.cache_hit);
    assert_eq!(response.meta.retries, 0);

    let snapshot = response.rate_limit.expect("success carries a snapshot");
    assert_eq!(snapshot.remaining, 99);
    assert!((snapshot.total_cost - 0.01).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn status_reflects_activity_and_clear_cache_scopes_by_service() {
    let manager = manager_with("exa", 100, 1000);
    let calls = Arc::new(AtomicUsize::new(0));

    let _: ApiResponse<Value> = manager
        .execute(
            "exa",
            counting_ok(&calls),
            &json!({"q": 1}),
            CallOptions::default(),
        )
        .await;
    let _: ApiResponse<Value> = manager
        .execute(
            "exa",
            counting_ok(&calls),
            &json!({"q": 2}),
            CallOptions::default(),
        )
        .await;

    let status = manager.status();
    assert_eq!(status.cache_size, 2);
    let exa = status
        .services
        .iter()
        .find(|s| s.service == "exa")
        .expect("exa is a known service");
    assert_eq!(exa.request_count, 2);
    assert_eq!(exa.cached_entries, 2);
    assert!((exa.total_cost - 0.02).abs() < f64::EPSILON);

    manager.clear_cache(Some("exa"));
    assert_eq!(manager.status().cache_size, 0);
}

#[tokio::test(start_paused = true)]
async fn status_includes_custom_services_from_the_quota_table() {
    let manager = manager_with("acme", 100, 1000);
    let calls = Arc::new(AtomicUsize::new(0));

    let response: ApiResponse<Value> = manager
        .execute(
            "acme",
            counting_ok(&calls),
            &json!({"q": 1}),
            CallOptions::default(),
        )
        .await;
    assert!(response.success);

    let status = manager.status();
    let acme = status
        .services
        .iter()
        .find(|s| s.service == "acme")
        .expect("governed custom service appears in status");
    assert_eq!(acme.request_count, 1);
    assert_eq!(acme.cached_entries, 1);
    assert!((acme.total_cost - 0.01).abs() < f64::EPSILON);

    // The built-ins are still listed even when idle.
    assert!(status.services.iter().any(|s| s.service == "exa"));
    assert!(status.services.iter().any(|s| s.service == "signalhub"));
}

#[tokio::test(start_paused = true)]
async fn malformed_key_fails_connection_test_without_reaching_governance() {
    let manager = manager_with("exa", 1, 1);

    let result = manager.test_connection("exa", "abc").await;

    assert!(!result.success);
    let error = result.error.unwrap_or_default();
    assert!(error.contains("invalid API key"), "unexpected error: {error}");
    // No quota consumed and no breaker movement.
    let status = manager.status();
    let exa = status
        .services
        .iter()
        .find(|s| s.service == "exa")
        .expect("exa is a known service");
    assert_eq!(exa.request_count, 0);
}

#[tokio::test(start_paused = true)]
async fn simulated_provider_flows_through_governance_ungoverned() {
    // signalhub has no quota entry, so governance is default-open.
    let manager = manager_with("exa", 1, 1);
    let client = prospect_core::providers::SignalHubClient::with_latency(Duration::from_millis(100));

    for i in 0..3 {
        let response = manager
            .execute(
                "signalhub",
                || client.fetch_signals("Acme Corp"),
                &json!({"company": "Acme Corp", "i": i}),
                CallOptions::default(),
            )
            .await;
        assert!(response.success, "simulated call {i} should succeed");
    }
}

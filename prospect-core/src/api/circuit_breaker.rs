//! Per-service circuit breaker with lazy open → half-open transitions.
//!
//! There is no background timer: an open circuit flips to half-open as a side
//! effect of the `can_execute` check once the cool-down has elapsed, and that
//! single check admits the probe call. The probe's recorded outcome decides
//! the next state.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::constants::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure: Option<Instant>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure: None,
        }
    }
}

#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_timeout: Duration,
    circuits: Mutex<HashMap<String, Circuit>>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_settings(defaults::FAILURE_THRESHOLD, defaults::CIRCUIT_RESET_TIMEOUT)
    }

    pub fn with_settings(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            reset_timeout,
            circuits: Mutex::new(HashMap::new()),
        }
    }

    /// Whether a call to `service` may proceed. Flips an open circuit to
    /// half-open once the cool-down since the last failure has elapsed, and
    /// admits that probe.
    pub fn can_execute(&self, service: &str) -> bool {
        let mut circuits = self.circuits.lock();
        let circuit = circuits.entry(service.to_string()).or_default();

        match circuit.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled_down = circuit
                    .last_failure
                    .is_none_or(|t| t.elapsed() > self.reset_timeout);
                if cooled_down {
                    circuit.state = CircuitState::HalfOpen;
                    tracing::debug!(service, "circuit half-open, admitting probe call");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call: zeroes the failure counter and closes the
    /// circuit from any state.
    pub fn record_success(&self, service: &str) {
        let mut circuits = self.circuits.lock();
        let circuit = circuits.entry(service.to_string()).or_default();

        if circuit.state != CircuitState::Closed {
            tracing::info!(service, "circuit closed after successful call");
        }
        circuit.state = CircuitState::Closed;
        circuit.consecutive_failures = 0;
    }

    /// Record a failed call. A half-open probe failure reopens the circuit
    /// immediately; in closed state the circuit opens once the consecutive
    /// failure count reaches the threshold.
    pub fn record_failure(&self, service: &str) {
        let mut circuits = self.circuits.lock();
        let circuit = circuits.entry(service.to_string()).or_default();

        circuit.consecutive_failures += 1;
        circuit.last_failure = Some(Instant::now());

        match circuit.state {
            CircuitState::HalfOpen => {
                circuit.state = CircuitState::Open;
                tracing::warn!(service, "probe failed, circuit reopened");
            }
            CircuitState::Closed if circuit.consecutive_failures >= self.failure_threshold => {
                circuit.state = CircuitState::Open;
                tracing::warn!(
                    service,
                    failures = circuit.consecutive_failures,
                    "failure threshold reached, circuit opened"
                );
            }
            _ => {}
        }
    }

    /// Current stored state, without triggering lazy transitions.
    pub fn state(&self, service: &str) -> CircuitState {
        let circuits = self.circuits.lock();
        circuits
            .get(service)
            .map_or(CircuitState::Closed, |c| c.state)
    }
}

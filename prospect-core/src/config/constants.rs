//! Centralized constants for services, governance defaults, and endpoints.

/// Canonical service names used as keys for rate-limit ledgers, circuit
/// state, and cache prefixes.
pub mod services {
    pub const EXA: &str = "exa";
    pub const OPENAI: &str = "openai";
    pub const PERPLEXITY: &str = "perplexity";
    /// Simulated provider; stands in for a signal feed with no public API.
    pub const SIGNALHUB: &str = "signalhub";

    /// Every service the status report covers, in display order.
    pub const ALL: [&str; 4] = [EXA, OPENAI, PERPLEXITY, SIGNALHUB];
}

/// Governance defaults shared by the manager and its components.
pub mod defaults {
    use std::time::Duration;

    /// Consecutive failures before a circuit opens.
    pub const FAILURE_THRESHOLD: u32 = 5;
    /// Cool-down before an open circuit admits a probe call.
    pub const CIRCUIT_RESET_TIMEOUT: Duration = Duration::from_secs(60);
    /// Default time-to-live for cached responses.
    pub const CACHE_TTL: Duration = Duration::from_secs(300);
    /// Default number of retries after the first attempt.
    pub const RETRY_COUNT: u32 = 3;
    /// Default per-attempt timeout.
    pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);
    /// Shorter timeout used by connection probes.
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
    /// Artificial latency of the simulated SignalHub provider.
    pub const SIGNALHUB_LATENCY: Duration = Duration::from_millis(800);
}

/// Default base URLs for the real providers.
pub mod endpoints {
    pub const EXA_BASE_URL: &str = "https://api.exa.ai";
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    pub const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
}

/// Default model for contact-enrichment completions.
pub const ENRICHMENT_MODEL: &str = "gpt-4o-mini";

//! Request governance: rate limiting, circuit breaking, response caching,
//! and the integration manager that composes them.

pub mod cache;
pub mod circuit_breaker;
pub mod manager;
pub mod rate_limiter;
pub mod types;

pub use cache::ResponseCache;
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use manager::ApiIntegrationManager;
pub use rate_limiter::{CostInfo, RateLimitDecision, RateLimiter};
pub use types::{
    ApiResponse, ApiStatus, CallMetadata, CallOptions, ConnectionTest, RateLimitInfo,
    ServiceStatus,
};

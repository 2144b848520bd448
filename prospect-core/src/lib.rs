//! # prospect-core — governed access to sales-intelligence providers
//!
//! `prospect-core` is the request-governance layer that sits between the
//! `prospect` CLI and the upstream intelligence providers (Exa semantic
//! search, OpenAI contact enrichment, Perplexity health checks, and the
//! simulated SignalHub feed). Every upstream call flows through a single
//! [`api::ApiIntegrationManager`], which composes:
//!
//! - a sliding-window **rate limiter** with per-minute and per-hour ceilings
//!   and cost accounting per service,
//! - a **circuit breaker** that sheds load from a failing provider and probes
//!   for recovery without background timers,
//! - an in-memory **response cache** with per-entry TTLs, and
//! - a bounded **retry loop** with per-attempt timeouts and exponential
//!   backoff.
//!
//! Callers receive a structured [`api::ApiResponse`] and branch on its
//! success flag; no error escapes the manager boundary as a panic or an
//! unhandled `Err`.
//!
//! The crate is organized into:
//!
//! - `config/`: rate-limit tables, provider endpoints, `prospect.toml`
//!   loading, and API-key retrieval/validation.
//! - `api/`: the governance components and the integration manager.
//! - `providers/`: thin request/response adapters for each upstream service.

pub mod api;
pub mod config;
pub mod providers;

pub use api::manager::ApiIntegrationManager;
pub use api::types::{ApiResponse, CallMetadata, CallOptions, RateLimitInfo};

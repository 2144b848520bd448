//! In-memory TTL cache for provider responses.
//!
//! Entries are evicted lazily on lookup; there is no sweeper task. Keys are
//! `service:params` where `params` is the compact JSON serialization of the
//! call parameters — `serde_json` object maps keep keys sorted, so two
//! logically identical parameter objects produce identical keys.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a service call with the given parameters.
    pub fn key(service: &str, params: &Value) -> String {
        format!("{service}:{params}")
    }

    /// Look up an entry, evicting it if its TTL has lapsed.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    pub fn set(&self, key: &str, value: Value, ttl: Duration) {
        let mut entries = self.entries.lock();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Stored entries whose key starts with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.entries
            .lock()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .count()
    }

    pub fn clear_prefix(&self, prefix: &str) {
        self.entries.lock().retain(|key, _| !key.starts_with(prefix));
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

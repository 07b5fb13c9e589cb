//! TTL cache with combined sliding and absolute expiration.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelfmark_core::Category;
use std::time::{Duration, Instant};

/// Default sliding window: 5 minutes.
const DEFAULT_SLIDING_TTL_MS: u64 = 5 * 60 * 1000;

/// Default absolute window: 30 minutes.
const DEFAULT_ABSOLUTE_TTL_MS: u64 = 30 * 60 * 1000;

/// Expiration configuration for [`TtlCache`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Sliding window in milliseconds, refreshed by every successful `get`.
    #[serde(default = "default_sliding_ttl_ms")]
    pub sliding_ttl_ms: u64,
    /// Absolute window in milliseconds, fixed at insert time.
    #[serde(default = "default_absolute_ttl_ms")]
    pub absolute_ttl_ms: u64,
}

fn default_sliding_ttl_ms() -> u64 {
    DEFAULT_SLIDING_TTL_MS
}

fn default_absolute_ttl_ms() -> u64 {
    DEFAULT_ABSOLUTE_TTL_MS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sliding_ttl_ms: DEFAULT_SLIDING_TTL_MS,
            absolute_ttl_ms: DEFAULT_ABSOLUTE_TTL_MS,
        }
    }
}

impl CacheConfig {
    /// Sets the sliding window.
    #[must_use]
    pub fn with_sliding_ttl(mut self, ttl: Duration) -> Self {
        self.sliding_ttl_ms = ttl.as_millis() as u64;
        self
    }

    /// Sets the absolute window.
    #[must_use]
    pub fn with_absolute_ttl(mut self, ttl: Duration) -> Self {
        self.absolute_ttl_ms = ttl.as_millis() as u64;
        self
    }
}

/// A single cache entry. Owned exclusively by the cache; the key registry
/// only ever holds the key string back-reference, never the value.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    category: Option<Category>,
    inserted_at: Instant,
    last_access: Instant,
}

impl CacheEntry {
    fn new(value: Value, category: Option<Category>) -> Self {
        let now = Instant::now();
        Self {
            value,
            category,
            inserted_at: now,
            last_access: now,
        }
    }

    /// An entry expires at `min(last_access + sliding, inserted_at + absolute)`.
    fn is_expired(&self, sliding: Duration, absolute: Duration, now: Instant) -> bool {
        let sliding_deadline = self.last_access + sliding;
        let absolute_deadline = self.inserted_at + absolute;
        now >= sliding_deadline.min(absolute_deadline)
    }
}

/// In-memory cache with per-entry sliding + absolute expiration.
///
/// Expired entries are removed when observed; there is no background sweeper.
/// No cross-entry locking beyond the DashMap shards.
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    sliding: Duration,
    absolute: Duration,
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("size", &self.entries.len())
            .field("sliding", &self.sliding)
            .field("absolute", &self.absolute)
            .finish()
    }
}

impl TtlCache {
    /// Creates a cache with the given expiration configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            sliding: Duration::from_millis(config.sliding_ttl_ms),
            absolute: Duration::from_millis(config.absolute_ttl_ms),
        }
    }

    /// Gets a live value, refreshing its sliding window.
    ///
    /// Returns `None` for absent or expired keys; an expired entry is removed
    /// on observation.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();

        if let Some(mut entry) = self.entries.get_mut(key) {
            if entry.is_expired(self.sliding, self.absolute, now) {
                drop(entry); // Release the shard lock before removing
                self.entries.remove(key);
                return None;
            }

            entry.last_access = now;
            return Some(entry.value.clone());
        }

        None
    }

    /// Stores a value, overwriting any previous entry and resetting both
    /// expiration windows.
    pub fn set(&self, key: impl Into<String>, value: Value, category: Option<Category>) {
        self.entries
            .insert(key.into(), CacheEntry::new(value, category));
    }

    /// Removes an entry. Returns `true` if a key was present.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Non-refreshing probe: is the key present and unexpired?
    pub fn contains_live(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.sliding, self.absolute, now))
    }

    /// Category tag of a live entry, if any.
    pub fn category_of(&self, key: &str) -> Option<Category> {
        self.entries.get(key).and_then(|entry| entry.category)
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

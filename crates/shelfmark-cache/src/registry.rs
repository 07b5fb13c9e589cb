//! Category-scoped cache key registry.
//!
//! The registry is the one piece of state mutated by multiple callers
//! concurrently: overlapping ingest calls invalidating categories while read
//! traffic registers keys. Map mutations go through a single mutex; the
//! hit/miss/invalidation counters are lock-free atomics.

use serde::Serialize;
use serde_json::Value;
use shelfmark_core::Category;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::store::TtlCache;

/// Index state guarded by the registry mutex.
///
/// Invariant: every key in `by_category[c]` (and in `untagged`) is also
/// present in `key_category`, and a key belongs to at most one category's
/// set, or to `untagged`, never both.
#[derive(Debug, Default)]
struct CategoryIndex {
    /// key -> its category tag (`None` for untagged keys).
    key_category: HashMap<String, Option<Category>>,
    /// category -> keys currently tracked under it.
    by_category: HashMap<Category, HashSet<String>>,
    /// Keys registered without a category.
    untagged: HashSet<String>,
}

impl CategoryIndex {
    /// Detaches a key from whichever set currently holds it.
    fn detach(&mut self, key: &str, previous: Option<Category>) {
        match previous {
            Some(category) => {
                if let Some(keys) = self.by_category.get_mut(&category) {
                    keys.remove(key);
                    if keys.is_empty() {
                        self.by_category.remove(&category);
                    }
                }
            }
            None => {
                self.untagged.remove(key);
            }
        }
    }
}

/// Central bookkeeping of live cache keys and their category tags.
///
/// All operations are total (they never fail) and safe under concurrent
/// callers. The registry holds only key strings; entry values stay owned by
/// the underlying [`TtlCache`].
pub struct CacheKeyRegistry {
    cache: Arc<TtlCache>,
    index: Mutex<CategoryIndex>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl std::fmt::Debug for CacheKeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheKeyRegistry")
            .field("stats", &self.stats())
            .finish()
    }
}

impl CacheKeyRegistry {
    /// Creates a registry over the given cache.
    pub fn new(cache: Arc<TtlCache>) -> Self {
        Self {
            cache,
            index: Mutex::new(CategoryIndex::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// The wrapped cache.
    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    /// Mutex poisoning only happens if a panic occurred mid-mutation; the
    /// index is still structurally sound for our operations, so recover.
    fn lock_index(&self) -> MutexGuard<'_, CategoryIndex> {
        self.index.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a key as live, optionally under a category.
    ///
    /// Idempotent: re-registering a key under the same category is a no-op.
    /// Re-registering under a different category moves the key; a key belongs
    /// to at most one category (or none).
    pub fn put(&self, key: impl Into<String>, category: Option<Category>) {
        let key = key.into();
        let mut index = self.lock_index();

        if let Some(&previous) = index.key_category.get(&key) {
            if previous == category {
                return;
            }
            index.detach(&key, previous);
        }

        match category {
            Some(cat) => {
                index.by_category.entry(cat).or_default().insert(key.clone());
            }
            None => {
                index.untagged.insert(key.clone());
            }
        }
        index.key_category.insert(key, category);
    }

    /// Convenience write path: stores the value in the cache and registers
    /// the key in one call.
    pub fn insert(&self, key: impl Into<String>, value: Value, category: Option<Category>) {
        let key = key.into();
        self.cache.set(key.clone(), value, category);
        self.put(key, category);
    }

    /// Reads through the cache, recording a hit or miss.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.cache.get(key) {
            Some(value) => {
                self.record_hit();
                Some(value)
            }
            None => {
                self.record_miss();
                None
            }
        }
    }

    /// Removes every key tracked under `category` from the cache and the
    /// index. Returns the number of keys removed; 0 when the category has no
    /// tracked keys. Keys of other categories and untagged keys are never
    /// touched.
    pub fn invalidate_category(&self, category: Category) -> usize {
        let keys = {
            let mut index = self.lock_index();
            let Some(keys) = index.by_category.remove(&category) else {
                return 0;
            };
            for key in &keys {
                index.key_category.remove(key);
            }
            keys
        };

        for key in &keys {
            self.cache.remove(key);
        }

        let removed = keys.len();
        self.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
        debug!(category = %category, removed, "invalidated category cache keys");
        removed
    }

    /// Removes every tracked key from the cache and clears all indices.
    /// Returns the number of keys removed.
    pub fn invalidate_all(&self) -> usize {
        let keys: Vec<String> = {
            let mut index = self.lock_index();
            let keys = index.key_category.keys().cloned().collect();
            index.key_category.clear();
            index.by_category.clear();
            index.untagged.clear();
            keys
        };

        for key in &keys {
            self.cache.remove(key);
        }

        let removed = keys.len();
        self.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
        debug!(removed, "invalidated all cache keys");
        removed
    }

    /// Records a cache hit. Independent of key tracking.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a cache miss. Independent of key tracking.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time statistics snapshot.
    pub fn stats(&self) -> CacheStatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate_percent = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64 * 100.0
        };

        CacheStatsSnapshot {
            hits,
            misses,
            hit_rate_percent,
            total_invalidations: self.invalidations.load(Ordering::Relaxed),
            active_keys: self.lock_index().key_category.len(),
        }
    }
}

/// A point-in-time snapshot of registry statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate_percent: f64,
    pub total_invalidations: u64,
    pub active_keys: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> CacheKeyRegistry {
        CacheKeyRegistry::new(Arc::new(TtlCache::default()))
    }

    #[test]
    fn test_put_is_idempotent() {
        let reg = registry();
        reg.put("k", Some(Category::Fiction));
        reg.put("k", Some(Category::Fiction));

        assert_eq!(reg.stats().active_keys, 1);
    }

    #[test]
    fn test_put_moves_key_between_categories() {
        let reg = registry();
        reg.put("k", Some(Category::Fiction));
        reg.put("k", Some(Category::Science));

        assert_eq!(reg.stats().active_keys, 1);
        assert_eq!(reg.invalidate_category(Category::Fiction), 0);
        assert_eq!(reg.invalidate_category(Category::Science), 1);
    }

    #[test]
    fn test_invalidate_category_is_targeted() {
        let reg = registry();
        reg.insert("fiction:list", json!([1]), Some(Category::Fiction));
        reg.insert("fiction:page:1", json!([2]), Some(Category::Fiction));
        reg.insert("science:list", json!([3]), Some(Category::Science));
        reg.insert("books:all", json!([4]), None);

        let removed = reg.invalidate_category(Category::Fiction);
        assert_eq!(removed, 2);

        // Other categories and untagged keys survive, in both index and cache.
        assert!(reg.cache().get("fiction:list").is_none());
        assert!(reg.cache().get("fiction:page:1").is_none());
        assert!(reg.cache().get("science:list").is_some());
        assert!(reg.cache().get("books:all").is_some());
        assert_eq!(reg.stats().active_keys, 2);
    }

    #[test]
    fn test_invalidate_unknown_category_is_noop() {
        let reg = registry();
        reg.put("k", Some(Category::Fiction));

        assert_eq!(reg.invalidate_category(Category::Poetry), 0);
        assert_eq!(reg.stats().total_invalidations, 0);
        assert_eq!(reg.stats().active_keys, 1);
    }

    #[test]
    fn test_invalidate_all_clears_everything() {
        let reg = registry();
        reg.insert("a", json!(1), Some(Category::Fiction));
        reg.insert("b", json!(2), Some(Category::Science));
        reg.insert("c", json!(3), None);

        assert_eq!(reg.invalidate_all(), 3);
        assert_eq!(reg.stats().active_keys, 0);
        assert!(reg.cache().is_empty());
        assert_eq!(reg.stats().total_invalidations, 3);
    }

    #[test]
    fn test_hit_rate_is_zero_without_lookups() {
        let reg = registry();
        let stats = reg.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hit_rate_percent, 0.0);
    }

    #[test]
    fn test_get_records_hits_and_misses() {
        let reg = registry();
        reg.insert("k", json!(1), None);

        assert!(reg.get("k").is_some());
        assert!(reg.get("k").is_some());
        assert!(reg.get("missing").is_none());

        let stats = reg.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate_percent - 66.666).abs() < 0.1);
    }

    #[test]
    fn test_total_invalidations_counts_keys_removed() {
        let reg = registry();
        for i in 0..4 {
            reg.insert(format!("f:{i}"), json!(i), Some(Category::Fiction));
        }
        reg.insert("s:0", json!(0), Some(Category::Science));

        reg.invalidate_category(Category::Fiction);
        reg.invalidate_category(Category::Fiction); // redundant, harmless
        reg.invalidate_category(Category::Science);

        assert_eq!(reg.stats().total_invalidations, 5);
    }

    #[test]
    fn test_concurrent_put_and_invalidate() {
        let reg = Arc::new(registry());
        let mut handles = Vec::new();

        for t in 0..4 {
            let reg = Arc::clone(&reg);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    let key = format!("t{t}:k{i}");
                    reg.insert(key, json!(i), Some(Category::Fiction));
                    if i % 10 == 0 {
                        reg.invalidate_category(Category::Fiction);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Whatever interleaving happened, one final sweep must leave the
        // index and cache empty together.
        reg.invalidate_category(Category::Fiction);
        let stats = reg.stats();
        assert_eq!(stats.active_keys, 0);
        assert!(reg.cache().is_empty());
    }
}

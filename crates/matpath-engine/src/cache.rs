//! Plan caching for batch fetches.
//!
//! Reduction is a pure function of the requester paths, the direction and
//! the separator, so cached plans never go stale when the tree changes.
//! Thread-safe using `Mutex` for LRU operations.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lru::LruCache;
use matpath::TreePath;

use crate::config::PlanCacheConfig;
use crate::planner::{BatchDirection, BatchPlan};

/// Cache key: direction, separator and the distinct sorted requester paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
    direction: BatchDirection,
    separator: char,
    paths: Vec<TreePath>,
}

impl PlanKey {
    /// Builds the normalized key for a batch.
    ///
    /// Order and duplicates in `paths` do not affect the key.
    pub fn new(direction: BatchDirection, paths: &[TreePath], separator: char) -> Self {
        let mut paths = paths.to_vec();
        paths.sort_unstable();
        paths.dedup();
        Self {
            direction,
            separator,
            paths,
        }
    }
}

/// Thread-safe LRU cache of reduced batch plans.
pub struct PlanCache {
    inner: Mutex<LruCache<PlanKey, BatchPlan>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl PlanCache {
    /// Creates a plan cache with the given configuration.
    pub fn new(config: PlanCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Gets a cached plan, promoting it to most-recently-used.
    pub fn get(&self, key: &PlanKey) -> Option<BatchPlan> {
        let mut cache = self.inner.lock().ok()?;
        match cache.get(key) {
            Some(plan) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(plan.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a plan, evicting the least recently used one when full.
    pub fn set(&self, key: PlanKey, plan: BatchPlan) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.put(key, plan);
        }
    }

    /// Returns the cached plan for `key`, building and storing it on a miss.
    ///
    /// The flag is true on a cache hit.
    pub fn get_or_build(
        &self,
        key: PlanKey,
        build: impl FnOnce() -> BatchPlan,
    ) -> (BatchPlan, bool) {
        if let Some(plan) = self.get(&key) {
            return (plan, true);
        }
        let plan = build();
        self.set(key, plan.clone());
        (plan, false)
    }

    /// Returns the number of cached plans.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(cache) => cache.len(),
            _ => 0,
        }
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all cached plans.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
    }

    /// Returns hit/miss counters.
    pub fn stats(&self) -> PlanCacheStats {
        PlanCacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for PlanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("PlanCache")
            .field("entries", &stats.entries)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}

/// Statistics about the plan cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanCacheStats {
    /// Number of cached plans.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: usize,
    /// Lookups that had to build a plan.
    pub misses: usize,
}

//! TTL memoization for whole-project analysis tools (knip, jscpd).
//!
//! One entry per key (the project root). Entries are replaced when they are
//! older than the TTL passed to the lookup; nothing is evicted otherwise.
//! Concurrent misses on the same key both run the computation and the last
//! writer wins.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default freshness window for cached tool results
pub const DEFAULT_TOOL_CACHE_TTL: Duration = Duration::from_secs(60);

struct CachedEntry<V> {
    stored_at: Instant,
    value: V,
}

/// Read-through cache with per-lookup TTL
pub struct ToolResultCache<V> {
    entries: Mutex<HashMap<String, CachedEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> Default for ToolResultCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_CACHE_TTL)
    }
}

impl<V> std::fmt::Debug for ToolResultCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolResultCache")
            .field("entries", &self.entries.lock().len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl<V: Clone> ToolResultCache<V> {
    /// Create a cache whose lookups default to `default_ttl`
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Cached value for `key` if it is younger than `ttl`
    pub fn get(&self, key: &str, ttl: Option<Duration>) -> Option<V> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key` with a fresh timestamp
    pub fn insert(&self, key: &str, value: V) {
        self.entries.lock().insert(
            key.to_string(),
            CachedEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Return the fresh cached value or compute, store and return a new one
    ///
    /// An `Err` from `compute` is returned as-is and nothing is stored.
    pub fn get_or_compute<F, E>(&self, key: &str, ttl: Option<Duration>, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(key, ttl) {
            debug!(key, "Tool cache hit");
            return Ok(hit);
        }

        debug!(key, "Tool cache miss");
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Async form of [`get_or_compute`](Self::get_or_compute)
    ///
    /// The lock is not held while `compute` runs.
    pub async fn get_or_compute_async<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(key, ttl) {
            debug!(key, "Tool cache hit");
            return Ok(hit);
        }

        debug!(key, "Tool cache miss");
        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop the entry for `key`; returns whether one existed
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fresh_entry_is_reused() {
        let cache: ToolResultCache<u32> = ToolResultCache::default();
        let calls = Cell::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("/repo", None, || {
                    calls.set(calls.get() + 1);
                    Ok::<_, String>(42)
                })
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_stale_entry_is_recomputed() {
        let cache: ToolResultCache<u32> = ToolResultCache::default();
        cache.insert("/repo", 1);

        // A zero TTL treats every entry as stale
        let value = cache
            .get_or_compute("/repo", Some(Duration::ZERO), || Ok::<_, String>(2))
            .unwrap();
        assert_eq!(value, 2);
        assert_eq!(cache.get("/repo", None), Some(2));
    }

    #[test]
    fn test_failure_is_not_cached() {
        let cache: ToolResultCache<u32> = ToolResultCache::default();

        let err = cache
            .get_or_compute("/repo", None, || Err::<u32, _>("knip crashed"))
            .unwrap_err();
        assert_eq!(err, "knip crashed");
        assert!(cache.is_empty());

        let value = cache
            .get_or_compute("/repo", None, || Ok::<_, &str>(7))
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_keys_are_independent() {
        let cache: ToolResultCache<&'static str> = ToolResultCache::default();
        cache.insert("/a", "a");
        cache.insert("/b", "b");

        assert!(cache.invalidate("/a"));
        assert!(!cache.invalidate("/a"));
        assert_eq!(cache.get("/b", None), Some("b"));

        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_async_compute() {
        let cache: ToolResultCache<Vec<String>> = ToolResultCache::new(Duration::from_secs(30));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let report = cache
                .get_or_compute_async("/repo", None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::io::Error>(vec!["src/unused.ts".to_string()])
                })
                .await
                .unwrap();
            assert_eq!(report.len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

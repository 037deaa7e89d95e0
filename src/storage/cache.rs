use moka::future::Cache;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::core::config;

/// Read-through cache with a fixed time-to-live and hit/miss counters
///
/// Thin wrapper over a `moka` future cache so the repository can report
/// cache effectiveness in the same shape for every kind of record.
pub struct TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    inner: Cache<K, V>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache whose entries expire `ttl` after insertion
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            inner: Cache::builder()
                .max_capacity(config::cache::MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the cached value, counting the lookup as hit or miss
    pub async fn get(&self, key: &K) -> Option<V> {
        let value = self.inner.get(key).await;
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    pub async fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value).await;
    }

    pub async fn invalidate(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks().await;
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            size: self.inner.entry_count(),
            hits,
            misses,
            hit_rate,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub size: u64,
    pub hits: u64,
    pub misses: u64,
    /// Percentage of lookups that were hits
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hits_and_misses_are_counted() {
        let cache: TtlCache<String, u32> = TtlCache::new("test", Duration::from_secs(60));

        assert_eq!(cache.get(&"a".to_string()).await, None);
        cache.insert("a".to_string(), 1).await;
        assert_eq!(cache.get(&"a".to_string()).await, Some(1));
        assert_eq!(cache.get(&"a".to_string()).await, Some(1));

        let stats = cache.stats().await;
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 66.666).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache: TtlCache<u32, u32> = TtlCache::new("short", Duration::from_millis(50));
        cache.insert(1, 10).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get(&1).await, None);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache: TtlCache<u32, &'static str> = TtlCache::new("test", Duration::from_secs(60));
        cache.insert(1, "one").await;
        cache.insert(2, "two").await;

        cache.invalidate(&1).await;
        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.get(&2).await, Some("two"));
        assert_eq!(cache.stats().await.size, 1);
    }

    #[tokio::test]
    async fn test_empty_cache_has_zero_hit_rate() {
        let cache: TtlCache<u32, u32> = TtlCache::new("empty", Duration::from_secs(1));
        assert_eq!(cache.stats().await.hit_rate, 0.0);
    }
}

//! Cache store backend with a local (DashMap) tier and an optional Redis tier.
//!
//! The cache is a side-cache only: it never owns data, it mirrors snapshots
//! computed from the data store. Any backend failure degrades to a miss.

use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached entry with TTL support.
///
/// The data is wrapped in `Arc` so cache hits clone a pointer, not the
/// serialized listing snapshot.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: Arc<Vec<u8>>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    /// Create a new cached entry.
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry has expired.
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// Key-value cache store with expire-on-write semantics.
///
/// ## Modes
///
/// - **Local**: single-instance mode, DashMap only
/// - **Redis**: multi-instance mode, DashMap (L1) + Redis (L2)
///
/// Redis writes and invalidations are fire-and-forget; a Redis outage makes
/// every lookup a miss but never surfaces as a request error.
#[derive(Clone)]
pub enum CacheBackend {
    /// Single-instance: local DashMap only
    Local(Arc<DashMap<String, CachedEntry>>),

    /// Multi-instance: Redis + local L1
    Redis {
        redis: Pool,
        local: Arc<DashMap<String, CachedEntry>>,
    },
}

impl CacheBackend {
    /// Create a new local-only cache backend.
    pub fn new_local() -> Self {
        CacheBackend::Local(Arc::new(DashMap::new()))
    }

    /// Create a new Redis-backed cache backend.
    pub fn new_redis(redis_pool: Pool) -> Self {
        CacheBackend::Redis {
            redis: redis_pool,
            local: Arc::new(DashMap::new()),
        }
    }

    /// Get a value from the cache.
    ///
    /// Lookup order: L1 (DashMap), then L2 (Redis) when configured. A value
    /// found in L2 is promoted to L1. Connection or protocol errors are
    /// logged and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        match self {
            CacheBackend::Local(map) => map
                .get(key)
                .filter(|entry| !entry.is_expired())
                .map(|entry| Arc::clone(&entry.data)),
            CacheBackend::Redis { redis, local } => {
                if let Some(entry) = local.get(key) {
                    if !entry.is_expired() {
                        tracing::debug!(key = %key, "cache hit (L1)");
                        return Some(Arc::clone(&entry.data));
                    } else {
                        drop(entry);
                        local.remove(key);
                    }
                }

                match redis.get().await {
                    Ok(mut conn) => match conn.get::<_, Option<Vec<u8>>>(key).await {
                        Ok(Some(data)) => {
                            tracing::debug!(key = %key, "cache hit (L2)");
                            let entry = CachedEntry::new(data, Duration::from_secs(3600));
                            let data_arc = Arc::clone(&entry.data);
                            local.insert(key.to_string(), entry);
                            Some(data_arc)
                        }
                        Ok(None) => {
                            tracing::debug!(key = %key, "cache miss");
                            None
                        }
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "Redis GET error");
                            None
                        }
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to get Redis connection");
                        None
                    }
                }
            }
        }
    }

    /// Set a value in the cache with TTL.
    ///
    /// Local mode writes to DashMap only; Redis mode writes to both tiers,
    /// with the Redis write fire-and-forget.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        match self {
            CacheBackend::Local(map) => {
                map.insert(key.to_string(), CachedEntry::new(value, ttl));
            }
            CacheBackend::Redis { redis, local } => {
                let entry = CachedEntry::new(value, ttl);
                let data_for_redis = Arc::clone(&entry.data);

                local.insert(key.to_string(), entry);

                let redis = redis.clone();
                let key = key.to_string();
                let ttl_secs = ttl.as_secs();
                tokio::spawn(async move {
                    if let Ok(mut conn) = redis.get().await {
                        if let Err(e) = conn
                            .set_ex::<_, _, ()>(&key, &*data_for_redis, ttl_secs)
                            .await
                        {
                            tracing::warn!(key = %key, error = %e, "Redis SET error");
                        } else {
                            tracing::debug!(key = %key, ttl_secs = %ttl_secs, "cache set (L1+L2)");
                        }
                    }
                });
            }
        }
    }

    /// Invalidate a cache entry.
    ///
    /// Not called on the catalog write paths today (expiry is time-based
    /// only), but available to writers that choose stronger consistency,
    /// and used internally when a cached payload fails to deserialize.
    pub async fn invalidate(&self, key: &str) {
        match self {
            CacheBackend::Local(map) => {
                map.remove(key);
                tracing::debug!(key = %key, "cache invalidated (local)");
            }
            CacheBackend::Redis { redis, local } => {
                local.remove(key);

                let redis = redis.clone();
                let key = key.to_string();
                tokio::spawn(async move {
                    if let Ok(mut conn) = redis.get().await {
                        if let Err(e) = conn.del::<_, ()>(&key).await {
                            tracing::warn!(key = %key, error = %e, "Redis DEL error");
                        }
                    }
                });
            }
        }
    }

    /// Get cache statistics (L1 only).
    pub fn stats(&self) -> CacheStats {
        match self {
            CacheBackend::Local(map) => CacheStats {
                l1_entries: map.len(),
                mode: "local".to_string(),
            },
            CacheBackend::Redis { local, .. } => CacheStats {
                l1_entries: local.len(),
                mode: "redis".to_string(),
            },
        }
    }

    /// Check if Redis is available (for health checks).
    pub async fn is_redis_available(&self) -> bool {
        match self {
            CacheBackend::Local(_) => false,
            CacheBackend::Redis { redis, .. } => redis.get().await.is_ok(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub l1_entries: usize,
    pub mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_set_then_get_round_trips() {
        let cache = CacheBackend::new_local();
        cache
            .set("academy:x", b"[1,2,3]".to_vec(), Duration::from_secs(60))
            .await;

        let data = cache.get("academy:x").await.expect("hit");
        assert_eq!(&*data, b"[1,2,3]");
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = CacheBackend::new_local();
        cache
            .set("k", b"v".to_vec(), Duration::from_secs(0))
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = CacheBackend::new_local();
        cache
            .set("k", b"v".to_vec(), Duration::from_secs(60))
            .await;
        cache.invalidate("k").await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn stats_report_mode_and_size() {
        let cache = CacheBackend::new_local();
        cache
            .set("k", b"v".to_vec(), Duration::from_secs(60))
            .await;
        let stats = cache.stats();
        assert_eq!(stats.mode, "local");
        assert_eq!(stats.l1_entries, 1);
    }
}

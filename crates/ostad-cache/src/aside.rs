//! Read-through cache-aside orchestration.
//!
//! Every cacheable catalog listing goes through [`CacheAside::get_or_compute`]:
//! check the cache store by key, return on hit, otherwise run the expensive
//! aggregation, store the JSON snapshot with a fixed TTL, and return it.
//!
//! There is deliberately no single-flight guard: concurrent misses for the
//! same key each recompute and overwrite the entry. Recomputation is
//! idempotent and the listings are read-mostly, so last-write-wins staleness
//! is acceptable.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::backend::CacheBackend;

/// Hit/miss counters for monitoring.
#[derive(Debug, Default)]
pub struct AsideStatistics {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AsideStatistics {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> AsideStatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        AsideStatsSnapshot {
            hits,
            misses,
            hit_ratio: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
        }
    }
}

/// A point-in-time snapshot of cache-aside statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AsideStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
}

/// The cache-aside orchestrator.
///
/// Cheap to clone; all clones share the backend and counters.
#[derive(Clone)]
pub struct CacheAside {
    backend: CacheBackend,
    stats: Arc<AsideStatistics>,
}

impl CacheAside {
    /// Create an orchestrator over the given cache store.
    pub fn new(backend: CacheBackend) -> Self {
        Self {
            backend,
            stats: Arc::new(AsideStatistics::default()),
        }
    }

    /// Access the underlying backend (for invalidation and health checks).
    pub fn backend(&self) -> &CacheBackend {
        &self.backend
    }

    /// Get cache-aside statistics.
    pub fn stats(&self) -> AsideStatsSnapshot {
        self.stats.snapshot()
    }

    /// Read through the cache.
    ///
    /// On a hit the cached JSON snapshot is deserialized and returned without
    /// touching the data store. On a miss (or any cache failure, which is
    /// treated as a miss) `compute` runs, its result is stored with `ttl`,
    /// and the freshly computed value is returned.
    ///
    /// Errors from `compute` propagate unchanged and nothing is cached.
    /// Serialization failures on the write side are logged and swallowed —
    /// a broken cache write must not fail a successful read.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(data) = self.backend.get(key).await {
            match serde_json::from_slice::<T>(&data) {
                Ok(value) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(value);
                }
                Err(e) => {
                    // Stale schema or corrupt payload: drop it and recompute
                    tracing::warn!(key = %key, error = %e, "Failed to deserialize cached snapshot");
                    self.backend.invalidate(key).await;
                }
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute().await?;

        match serde_json::to_vec(&value) {
            Ok(data) => {
                self.backend.set(key, data, ttl).await;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to serialize snapshot for cache");
            }
        }

        Ok(value)
    }
}

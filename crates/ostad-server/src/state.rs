//! Shared application state.

use std::sync::Arc;

use deadpool_redis::{Config as RedisConfig, Runtime};
use ostad_cache::{CacheAside, CacheBackend};
use ostad_db_memory::InMemoryCatalog;
use ostad_search::SearchEngine;
use ostad_storage::CatalogStore;

use crate::aggregation::Aggregator;
use crate::config::{AppConfig, CacheMode};
use crate::error::{Result, ServerError};

/// Everything a request handler needs, cloned per request.
///
/// All members are behind `Arc`s (or are cheap handle types), so cloning the
/// state is a handful of reference-count bumps.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub cache: CacheAside,
    pub search: Arc<SearchEngine>,
    pub aggregator: Aggregator,
}

impl AppState {
    /// Assemble state from explicit parts. Used directly by tests, which
    /// inject a pre-seeded store and a local cache.
    pub fn new(store: Arc<dyn CatalogStore>, cache: CacheAside) -> Self {
        let aggregator = Aggregator::new(Arc::clone(&store));
        Self {
            store,
            cache,
            search: Arc::new(SearchEngine::default()),
            aggregator,
        }
    }

    /// Build state according to the application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn CatalogStore> = match config.storage.backend.as_str() {
            "memory" => Arc::new(InMemoryCatalog::new()),
            other => {
                return Err(ServerError::config(format!(
                    "unknown storage.backend: {other}"
                )));
            }
        };

        let backend = match config.cache.mode {
            CacheMode::Local => CacheBackend::new_local(),
            CacheMode::Redis => {
                let url = config
                    .cache
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| ServerError::config("cache.redis_url is required"))?;
                let mut redis_cfg = RedisConfig::from_url(url);
                redis_cfg.pool = Some(deadpool_redis::PoolConfig::new(config.cache.pool_size));
                let pool = redis_cfg
                    .create_pool(Some(Runtime::Tokio1))
                    .map_err(|e| ServerError::cache(format!("failed to create redis pool: {e}")))?;
                CacheBackend::new_redis(pool)
            }
        };

        tracing::info!(
            storage = store.backend_name(),
            cache = ?config.cache.mode,
            "Application state initialized"
        );

        Ok(Self::new(store, CacheAside::new(backend)))
    }
}

//! Server configuration.
//!
//! Settings are loaded from an optional TOML file and then overridden by
//! environment variables with the `OSTAD__` prefix, e.g.
//! `OSTAD__SERVER__PORT=8080` or `OSTAD__CACHE__MODE=redis`.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend. Only `memory` is currently available.
    #[serde(default = "default_storage_backend")]
    pub backend: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// In-process cache only.
    Local,
    /// In-process cache in front of a shared Redis tier.
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_mode")]
    pub mode: CacheMode,
    /// Connection URL for the Redis tier, e.g. `redis://127.0.0.1:6379`.
    /// Required when `mode = "redis"`.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Redis pool size when the Redis tier is enabled.
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: default_cache_mode(),
            redis_url: None,
            pool_size: default_redis_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `info` or `ostad_server=debug,info`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

fn default_cache_mode() -> CacheMode {
    CacheMode::Local
}

fn default_redis_pool_size() -> usize {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from an optional TOML file plus `OSTAD__*`
    /// environment overrides, then validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = loader::load(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.server
            .host
            .parse::<IpAddr>()
            .map_err(|_| ServerError::config(format!("invalid server.host: {}", self.server.host)))?;
        if self.server.port == 0 {
            return Err(ServerError::config("server.port must be non-zero"));
        }
        if self.server.body_limit == 0 {
            return Err(ServerError::config("server.body_limit must be non-zero"));
        }
        if self.storage.backend != "memory" {
            return Err(ServerError::config(format!(
                "unknown storage.backend: {}",
                self.storage.backend
            )));
        }
        if self.cache.mode == CacheMode::Redis && self.cache.redis_url.is_none() {
            return Err(ServerError::config(
                "cache.redis_url is required when cache.mode = \"redis\"",
            ));
        }
        if self.cache.pool_size == 0 {
            return Err(ServerError::config("cache.pool_size must be non-zero"));
        }
        Ok(())
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ServerError::config(format!("invalid server.host: {}", self.server.host)))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

mod loader {
    use std::path::Path;

    use config::{Config, Environment, File};

    use super::AppConfig;
    use crate::error::{Result, ServerError};

    pub(super) fn load(path: Option<&Path>) -> Result<AppConfig> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ServerError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.to_path_buf()));
        }

        builder = builder.add_source(
            Environment::with_prefix("OSTAD")
                .try_parsing(true)
                .separator("__"),
        );

        let config = builder
            .build()
            .map_err(|e| ServerError::config(format!("failed to read configuration: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::config(format!("invalid configuration: {e}")))
    }
}

//! Provider Factory
//!
//! Creates identification adapters, cache stores and lock stores from
//! configuration. All implementations come from the flora-providers crate.

use std::sync::Arc;
use std::time::Duration;

use flora_domain::error::{Error, Result};
use flora_domain::ports::{CacheProvider, IdentificationProvider, LockProvider};
use flora_providers::cache::{MokaCacheProvider, NullCacheProvider};
use flora_providers::identification::{
    NullIdentificationProvider, PlantIdProvider, PlantNetProvider,
};
use flora_providers::lock::{MemoryLockProvider, NullLockProvider};
use reqwest::Client;

use crate::config::{CacheBackend, CacheConfig, LockBackend, LockConfig, ProviderConfig, ProviderKind};
use crate::constants::{HTTP_CONNECT_TIMEOUT_SECS, HTTP_POOL_MAX_IDLE_PER_HOST, HTTP_USER_AGENT};
use crate::error_ext::ErrorContext;

/// Build the HTTP client shared by the identification adapters
///
/// No client-wide request timeout is set; each call carries its provider's
/// own timeout.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(HTTP_USER_AGENT)
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE_PER_HOST)
        .build()
        .network_context("Failed to build HTTP client")
}

/// Factory for identification adapters
pub struct IdentificationProviderFactory;

impl IdentificationProviderFactory {
    /// Create the adapter for one provider slot
    pub fn create(
        config: &ProviderConfig,
        http_client: Client,
    ) -> Result<Arc<dyn IdentificationProvider>> {
        match config.kind {
            ProviderKind::PlantId => {
                let api_key = Self::require_api_key(config, "Plant.id")?;
                Ok(Arc::new(PlantIdProvider::new(
                    api_key,
                    config.base_url.as_deref(),
                    http_client,
                )))
            }
            ProviderKind::PlantNet => {
                let api_key = Self::require_api_key(config, "Pl@ntNet")?;
                Ok(Arc::new(PlantNetProvider::new(
                    api_key,
                    config.base_url.as_deref(),
                    http_client,
                )))
            }
            ProviderKind::Disabled => Ok(Arc::new(NullIdentificationProvider::new())),
        }
    }

    fn require_api_key<'a>(config: &'a ProviderConfig, provider: &str) -> Result<&'a str> {
        config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::config(format!("{provider} provider requires an API key")))
    }
}

/// Factory for result cache stores
pub struct CacheProviderFactory;

impl CacheProviderFactory {
    pub fn create(config: &CacheConfig) -> Result<Arc<dyn CacheProvider>> {
        if !config.enabled {
            return Ok(Arc::new(NullCacheProvider::new()));
        }
        match config.provider {
            CacheBackend::Moka => Ok(Arc::new(MokaCacheProvider::with_capacity(config.capacity))),
            CacheBackend::Redis => {
                let url = config
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| Error::config("cache.redis_url is not set"))?;
                create_redis_cache(url)
            }
            CacheBackend::Null => Ok(Arc::new(NullCacheProvider::new())),
        }
    }
}

/// Factory for stampede lock stores
pub struct LockProviderFactory;

impl LockProviderFactory {
    /// Create the lock store; a Redis lock without its own URL shares `fallback_url`
    pub fn create(config: &LockConfig, fallback_url: Option<&str>) -> Result<Arc<dyn LockProvider>> {
        match config.provider {
            LockBackend::Memory => Ok(Arc::new(MemoryLockProvider::new())),
            LockBackend::Redis => {
                let url = config
                    .redis_url
                    .as_deref()
                    .or(fallback_url)
                    .ok_or_else(|| Error::config("lock.redis_url is not set"))?;
                create_redis_lock(url)
            }
            LockBackend::Null => Ok(Arc::new(NullLockProvider::new())),
        }
    }
}

#[cfg(feature = "redis")]
fn create_redis_cache(url: &str) -> Result<Arc<dyn CacheProvider>> {
    tracing::debug!("Creating Redis cache provider");
    Ok(Arc::new(flora_providers::cache::RedisCacheProvider::new(url)?))
}

#[cfg(not(feature = "redis"))]
fn create_redis_cache(_url: &str) -> Result<Arc<dyn CacheProvider>> {
    Err(Error::config("Redis cache requested but the redis feature is disabled"))
}

#[cfg(feature = "redis")]
fn create_redis_lock(url: &str) -> Result<Arc<dyn LockProvider>> {
    tracing::debug!("Creating Redis lock provider");
    Ok(Arc::new(flora_providers::lock::RedisLockProvider::new(url)?))
}

#[cfg(not(feature = "redis"))]
fn create_redis_lock(_url: &str) -> Result<Arc<dyn LockProvider>> {
    Err(Error::config("Redis lock requested but the redis feature is disabled"))
}

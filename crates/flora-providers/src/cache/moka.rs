//! Moka in-memory cache provider
//!
//! Concurrent in-memory cache with per-entry expiry. Each entry keeps the TTL
//! it was written with, so complete and partial results can live for
//! different amounts of time in the same cache.
//!
//! ```ignore
//! use flora_providers::cache::MokaCacheProvider;
//!
//! let provider = MokaCacheProvider::with_capacity(10_000);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use flora_domain::error::{Error, Result};
use flora_domain::ports::{CacheEntryConfig, CacheProvider, CacheStats};
use moka::Expiry;
use moka::future::Cache;

use crate::constants::{CACHE_DEFAULT_MAX_ENTRIES, CACHE_MAX_VALUE_BYTES};

#[derive(Clone)]
struct CachedValue {
    bytes: Arc<[u8]>,
    ttl: Duration,
}

struct PerEntryExpiry;

impl Expiry<String, CachedValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based in-memory cache provider
#[derive(Clone)]
pub struct MokaCacheProvider {
    cache: Cache<String, CachedValue>,
    max_entries: u64,
}

impl Default for MokaCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaCacheProvider {
    pub fn new() -> Self {
        Self::with_capacity(CACHE_DEFAULT_MAX_ENTRIES)
    }

    /// Create a provider holding at most `max_entries` entries
    pub fn with_capacity(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryExpiry)
            .build();

        Self { cache, max_entries }
    }

    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let Some(value) = self.cache.get(key).await else {
            return Ok(None);
        };
        let json = String::from_utf8(value.bytes.to_vec()).map_err(|e| {
            Error::infrastructure_with_source(format!("Invalid UTF-8 in cached value: {e}"), e)
        })?;
        Ok(Some(json))
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let bytes = value.as_bytes();

        if bytes.len() > CACHE_MAX_VALUE_BYTES {
            return Err(Error::infrastructure(format!(
                "Cache value size {} exceeds maximum size {}",
                bytes.len(),
                CACHE_MAX_VALUE_BYTES
            )));
        }

        let entry = CachedValue {
            bytes: Arc::from(bytes),
            ttl: config.effective_ttl(),
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        // entry_count is only accurate after pending maintenance ran
        self.cache.run_pending_tasks().await;

        Ok(CacheStats {
            entries: self.cache.entry_count(),
            ..CacheStats::new()
        })
    }

    async fn size(&self) -> Result<usize> {
        self.cache.run_pending_tasks().await;
        Ok(usize::try_from(self.cache.entry_count()).unwrap_or(usize::MAX))
    }

    fn provider_name(&self) -> &str {
        "moka"
    }
}

impl std::fmt::Debug for MokaCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheProvider")
            .field("max_entries", &self.max_entries)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

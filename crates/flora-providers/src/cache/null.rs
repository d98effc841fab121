//! Null cache provider
//!
//! Stores nothing. Selected when caching is disabled; every read is a miss.

use async_trait::async_trait;
use flora_domain::error::Result;
use flora_domain::ports::{CacheEntryConfig, CacheProvider, CacheStats};

/// Null cache provider that doesn't store anything
#[derive(Debug, Clone, Default)]
pub struct NullCacheProvider;

impl NullCacheProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheProvider for NullCacheProvider {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: &str, _config: CacheEntryConfig) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats::new())
    }

    async fn size(&self) -> Result<usize> {
        Ok(0)
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}

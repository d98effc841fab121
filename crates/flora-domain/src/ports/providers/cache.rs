//! Cache Provider Port
//!
//! Port for the shared result store. Supports in-memory (Moka), distributed
//! (Redis) and null backends. Expiry is the store's job: entries carry their
//! own TTL and a backend must stop returning them once it elapses.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default TTL for cache entries (24 hours)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;

/// Cache Entry Configuration
///
/// Configures how a cache entry is stored.
///
/// ```ignore
/// let config = CacheEntryConfig::default().with_ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntryConfig {
    /// Time to live for the cache entry
    pub ttl: Option<Duration>,
}

impl CacheEntryConfig {
    pub fn new() -> Self {
        Self {
            ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Get the effective TTL, falling back to default
    pub fn effective_ttl(&self) -> Duration {
        self.ttl
            .unwrap_or(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl Default for CacheEntryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache backend statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
    /// Cache hit rate (0.0 to 1.0)
    pub hit_rate: f64,
    pub bytes_used: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate hit rate from hits and misses
    pub fn calculate_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Cache Provider Port
///
/// JSON-based storage with per-entry TTL. Errors returned from these methods
/// are store outages; callers in the identification path absorb them.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    /// Get a value as JSON string; `None` if absent or expired
    async fn get_json(&self, key: &str) -> Result<Option<String>>;

    /// Store a JSON string with the entry's TTL
    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()>;

    /// Delete a value; true if the key existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Check if a key exists and hasn't expired
    async fn exists(&self, key: &str) -> Result<bool>;

    async fn clear(&self) -> Result<()>;

    async fn stats(&self) -> Result<CacheStats>;

    /// Number of entries
    async fn size(&self) -> Result<usize>;

    /// Provider identifier ("moka", "redis", "null")
    fn provider_name(&self) -> &str;
}

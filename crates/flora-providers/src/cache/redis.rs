//! Redis distributed cache provider
//!
//! Shared result store for multi-instance deployments. Entries are written
//! with `SET EX` so Redis expires them on its own.
//!
//! ```ignore
//! use flora_providers::cache::RedisCacheProvider;
//!
//! let provider = RedisCacheProvider::new("redis://localhost:6379")?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use flora_domain::error::{Error, Result};
use flora_domain::ports::{CacheEntryConfig, CacheProvider, CacheStats};
use parking_lot::RwLock;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};

/// Redis cache provider
#[derive(Clone)]
pub struct RedisCacheProvider {
    client: Client,
    server: String,
    stats: Arc<RwLock<CacheStats>>,
}

impl RedisCacheProvider {
    /// Create a provider for a Redis URL (e.g. `redis://localhost:6379`)
    ///
    /// No connection is made until the first operation.
    pub fn new(connection_string: &str) -> Result<Self> {
        let client = Client::open(connection_string).map_err(|e| {
            Error::infrastructure_with_source(format!("Failed to create Redis client: {e}"), e)
        })?;

        Ok(Self {
            client,
            server: server_address(connection_string),
            stats: Arc::new(RwLock::new(CacheStats::new())),
        })
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                Error::infrastructure_with_source(format!("Failed to get Redis connection: {e}"), e)
            })
    }

    fn record(&self, hit: bool) {
        let mut stats = self.stats.write();
        if hit {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        stats.hit_rate = stats.calculate_hit_rate();
    }

    fn command_error(command: &str, e: redis::RedisError) -> Error {
        Error::infrastructure_with_source(format!("Redis {command} failed: {e}"), e)
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;

        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| Self::command_error("GET", e))?;
        self.record(value.is_some());
        Ok(value)
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let mut conn = self.get_connection().await?;

        let ttl_seconds = config.effective_ttl().as_secs().max(1);
        let result: redis::RedisResult<()> = conn.set_ex(key, value, ttl_seconds).await;
        result.map_err(|e| Self::command_error("SET", e))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;

        let deleted: i64 = conn
            .del(key)
            .await
            .map_err(|e| Self::command_error("DEL", e))?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;

        let exists: i64 = conn
            .exists(key)
            .await
            .map_err(|e| Self::command_error("EXISTS", e))?;
        Ok(exists > 0)
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;

        let result: redis::RedisResult<()> = redis::cmd("FLUSHDB").query_async(&mut conn).await;
        result.map_err(|e| Self::command_error("FLUSHDB", e))
    }

    async fn stats(&self) -> Result<CacheStats> {
        let entries = self.size().await?;
        let mut stats = self.stats.read().clone();
        stats.entries = entries as u64;
        Ok(stats)
    }

    async fn size(&self) -> Result<usize> {
        let mut conn = self.get_connection().await?;

        let dbsize: redis::RedisResult<usize> = redis::cmd("DBSIZE").query_async(&mut conn).await;
        dbsize.map_err(|e| Self::command_error("DBSIZE", e))
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

/// Host part of a Redis URL, without credentials
pub(crate) fn server_address(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = without_scheme
        .rsplit_once('@')
        .map_or(without_scheme, |(_, host)| host);
    host.to_string()
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("server", &self.server)
            .finish()
    }
}

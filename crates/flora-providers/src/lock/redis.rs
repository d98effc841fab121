//! Redis stampede lock
//!
//! `SET key token NX PX ttl` to acquire, and a compare-and-delete script to
//! release, so an expired holder can never delete a lock that has since been
//! taken by someone else.

use std::time::Duration;

use async_trait::async_trait;
use flora_domain::error::{Error, Result};
use flora_domain::ports::{LockGuard, LockProvider};
use redis::{Client, Script, aio::MultiplexedConnection};
use uuid::Uuid;

use crate::cache::redis::server_address;
use crate::constants::REDIS_LOCK_RELEASE_SCRIPT;

/// Redis-backed lock provider
#[derive(Clone)]
pub struct RedisLockProvider {
    client: Client,
    server: String,
    release_script: Script,
}

impl RedisLockProvider {
    /// Create a lock provider for a Redis URL
    pub fn new(connection_string: &str) -> Result<Self> {
        let client = Client::open(connection_string).map_err(|e| {
            Error::infrastructure_with_source(format!("Failed to create Redis client: {e}"), e)
        })?;

        Ok(Self {
            client,
            server: server_address(connection_string),
            release_script: Script::new(REDIS_LOCK_RELEASE_SCRIPT),
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
}

#[async_trait]
impl LockProvider for RedisLockProvider {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockGuard>> {
        let mut conn = self.get_connection().await?;
        let token = Uuid::new_v4().to_string();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::infrastructure_with_source(format!("Redis SET NX failed: {e}"), e))?;

        Ok(reply.map(|_| LockGuard::new(key, token)))
    }

    async fn release(&self, guard: &LockGuard) -> Result<bool> {
        let mut conn = self.get_connection().await?;

        let deleted: i64 = self
            .release_script
            .key(&guard.key)
            .arg(&guard.token)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                Error::infrastructure_with_source(format!("Redis lock release failed: {e}"), e)
            })?;

        Ok(deleted == 1)
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisLockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLockProvider")
            .field("server", &self.server)
            .finish()
    }
}

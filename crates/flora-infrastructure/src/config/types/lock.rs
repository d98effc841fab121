//! Stampede lock configuration types

use std::time::Duration;

use flora_application::cache::StampedeConfig;
use serde::{Deserialize, Serialize};

/// Lock stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockBackend {
    /// Process-local lock table; only protects a single instance
    Memory,
    /// Shared lock (Redis `SET NX PX`)
    Redis,
    /// Always grants; disables stampede protection
    Null,
}

/// Stampede lock configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub provider: LockBackend,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,

    /// Lock expiry; must outlast the slowest provider timeout
    pub ttl_ms: u64,
    pub acquire_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub direct_fill_permits: usize,
    pub direct_fill_jitter_ms: u64,
}

impl LockConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn to_stampede_config(&self) -> StampedeConfig {
        StampedeConfig {
            lock_ttl: self.ttl(),
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            direct_fill_permits: self.direct_fill_permits,
            direct_fill_jitter: Duration::from_millis(self.direct_fill_jitter_ms),
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        let defaults = StampedeConfig::default();
        Self {
            provider: LockBackend::Memory,
            redis_url: None,
            ttl_ms: millis(defaults.lock_ttl),
            acquire_timeout_ms: millis(defaults.acquire_timeout),
            poll_interval_ms: millis(defaults.poll_interval),
            poll_timeout_ms: millis(defaults.poll_timeout),
            direct_fill_permits: defaults.direct_fill_permits,
            direct_fill_jitter_ms: millis(defaults.direct_fill_jitter),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

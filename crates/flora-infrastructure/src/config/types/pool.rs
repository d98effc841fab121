//! Worker pool configuration types

use std::time::Duration;

use flora_application::constants::WORKER_POOL_DRAIN_TIMEOUT;
use flora_application::pool::WorkerPoolConfig;
use serde::{Deserialize, Serialize};

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Execution slots; unset means `min(4 × cores, 32)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    /// How long shutdown waits for running provider calls
    pub drain_timeout_secs: u64,
}

impl PoolConfig {
    pub fn to_worker_pool_config(&self) -> WorkerPoolConfig {
        let size = self.size.unwrap_or_else(WorkerPoolConfig::default_size);
        WorkerPoolConfig::with_size(size)
            .with_drain_timeout(Duration::from_secs(self.drain_timeout_secs))
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: None,
            drain_timeout_secs: WORKER_POOL_DRAIN_TIMEOUT.as_secs(),
        }
    }
}

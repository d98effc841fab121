//! Process-wide worker pool
//!
//! The pool is created lazily on first use and lives for the rest of the
//! process. Binaries hold a [`PoolShutdownGuard`] so in-flight work is
//! cancelled on exit even when the explicit shutdown is skipped.

use std::sync::{Arc, OnceLock};

use flora_domain::error::{Error, Result};

use super::worker_pool::{WorkerPool, WorkerPoolConfig};

static GLOBAL_POOL: OnceLock<Arc<WorkerPool>> = OnceLock::new();

/// Initialize the global pool with an explicit configuration
///
/// Fails if the pool was already created.
pub fn init_global_pool(config: WorkerPoolConfig) -> Result<Arc<WorkerPool>> {
    let pool = WorkerPool::new_shared(config);
    GLOBAL_POOL
        .set(Arc::clone(&pool))
        .map_err(|_| Error::internal("Global worker pool already initialized"))?;
    Ok(pool)
}

/// Get the global pool, creating it with the default configuration if absent
pub fn global_pool() -> Arc<WorkerPool> {
    Arc::clone(GLOBAL_POOL.get_or_init(|| WorkerPool::new_shared(WorkerPoolConfig::default())))
}

/// Get the global pool if it exists, creating it from `config` otherwise
pub fn global_pool_with(config: WorkerPoolConfig) -> Arc<WorkerPool> {
    Arc::clone(GLOBAL_POOL.get_or_init(|| WorkerPool::new_shared(config)))
}

/// Cancels the pool's in-flight work when dropped
#[derive(Debug)]
#[must_use = "the pool is cancelled as soon as the guard is dropped"]
pub struct PoolShutdownGuard {
    pool: Arc<WorkerPool>,
}

impl PoolShutdownGuard {
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }
}

impl Drop for PoolShutdownGuard {
    fn drop(&mut self) {
        self.pool.cancel_all();
    }
}

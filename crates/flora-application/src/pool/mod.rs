//! Worker pool

pub mod global;
pub mod worker_pool;

pub use global::{PoolShutdownGuard, global_pool, global_pool_with, init_global_pool};
pub use worker_pool::{TaskHandle, WorkerPool, WorkerPoolConfig, WorkerPoolStats};

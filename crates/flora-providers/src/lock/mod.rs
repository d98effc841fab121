//! Stampede Lock Implementations
//!
//! | Provider | Scope | Description |
//! |----------|-------|-------------|
//! | NullLockProvider | None | Always grants the lock |
//! | MemoryLockProvider | Process | DashMap with expiring entries |
//! | RedisLockProvider | Cluster | `SET NX PX` + compare-and-delete |

pub mod memory;
pub mod null;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryLockProvider;
pub use null::NullLockProvider;
#[cfg(feature = "redis")]
pub use self::redis::RedisLockProvider;

pub use flora_domain::ports::{LockGuard, LockProvider};

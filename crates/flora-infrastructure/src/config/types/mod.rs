//! Configuration types module

pub mod app;
pub mod cache;
pub mod lock;
pub mod logging;
pub mod pool;
pub mod providers;

pub use app::AppConfig;
pub use cache::{CacheBackend, CacheConfig};
pub use lock::{LockBackend, LockConfig};
pub use logging::LoggingConfig;
pub use pool::PoolConfig;
pub use providers::{CircuitConfig, ProviderConfig, ProviderKind, ProvidersConfig};

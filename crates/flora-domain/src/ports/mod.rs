//! Domain Port Interfaces
//!
//! Boundary traits implemented by `flora-providers` and consumed by
//! `flora-application`.

/// Infrastructure ports (locks, events)
pub mod infrastructure;
/// External provider ports (identification, cache)
pub mod providers;

pub use infrastructure::{
    DomainEventStream, EventBusProvider, LockGuard, LockProvider, SharedEventBus,
};
pub use providers::{
    CacheEntryConfig, CacheProvider, CacheStats, IdentificationProvider,
};

//! # Flora - Provider Implementations
//!
//! Concrete implementations of the ports declared in `flora-domain`.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Identification | `IdentificationProvider` | Plant.id, Pl@ntNet, Null |
//! | Cache | `CacheProvider` | Moka, Redis, Null |
//! | Lock | `LockProvider` | Memory, Redis, Null |
//! | Events | `EventBusProvider` | Tokio, Null |
//!
//! ## Feature Flags
//!
//! - `cache-moka`: in-process Moka cache
//! - `redis`: Redis cache and Redis stampede lock

pub use flora_domain::error::{Error, Result};
pub use flora_domain::ports::{
    CacheProvider, EventBusProvider, IdentificationProvider, LockProvider,
};

/// Provider-specific constants
pub mod constants;

/// Shared utilities for provider implementations
pub mod utils;

/// Cache provider implementations
pub mod cache;

/// Event bus implementations
pub mod events;

/// Identification adapters
pub mod identification;

/// Stampede lock implementations
pub mod lock;

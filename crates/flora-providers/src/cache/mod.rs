//! Cache Provider Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | NullCacheProvider | Disabled | Stores nothing |
//! | MokaCacheProvider | In-Process | Moka with per-entry TTL |
//! | RedisCacheProvider | Distributed | Shared across instances |

#[cfg(feature = "cache-moka")]
pub mod moka;
pub mod null;
#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "cache-moka")]
pub use self::moka::MokaCacheProvider;
pub use null::NullCacheProvider;
#[cfg(feature = "redis")]
pub use self::redis::RedisCacheProvider;

pub use flora_domain::ports::{CacheEntryConfig, CacheProvider, CacheStats};

//! Root configuration

use serde::{Deserialize, Serialize};

use super::{CacheConfig, LockConfig, LoggingConfig, PoolConfig, ProvidersConfig};

/// Application configuration
///
/// Every section falls back to its defaults, so a TOML file only needs the
/// keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub providers: ProvidersConfig,
    pub pool: PoolConfig,
    pub cache: CacheConfig,
    pub lock: LockConfig,
}

//! Result cache configuration types

use std::time::Duration;

use flora_application::constants::{PARTIAL_RESULT_TTL, RESULT_TTL};
use flora_application::use_cases::CachePolicy;
use serde::{Deserialize, Serialize};

use crate::constants::CACHE_DEFAULT_CAPACITY;

/// Cache stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// In-process cache (Moka)
    Moka,
    /// Shared cache (Redis)
    Redis,
    /// Stores nothing
    Null,
}

/// Result cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    pub provider: CacheBackend,

    /// TTL of complete results in seconds
    pub ttl_secs: u64,

    /// TTL of partial (secondary-only) results in seconds
    pub partial_ttl_secs: u64,

    /// Maximum entries of the in-process store
    pub capacity: u64,

    /// Redis URL, also used by a Redis lock without its own URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,

    /// Prefix for keys in a shared store; empty for none
    pub namespace: String,
}

impl CacheConfig {
    pub fn to_policy(&self) -> CachePolicy {
        CachePolicy {
            enabled: self.enabled,
            ttl: Duration::from_secs(self.ttl_secs),
            partial_ttl: Duration::from_secs(self.partial_ttl_secs),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: CacheBackend::Moka,
            ttl_secs: RESULT_TTL.as_secs(),
            partial_ttl_secs: PARTIAL_RESULT_TTL.as_secs(),
            capacity: CACHE_DEFAULT_CAPACITY,
            redis_url: None,
            namespace: String::new(),
        }
    }
}

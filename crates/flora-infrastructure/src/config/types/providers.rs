//! Identification provider configuration types

use std::time::Duration;

use flora_application::constants::{
    CIRCUIT_SUCCESS_THRESHOLD, PRIMARY_FAILURE_THRESHOLD, PRIMARY_RESET_TIMEOUT,
    SECONDARY_FAILURE_THRESHOLD, SECONDARY_RESET_TIMEOUT,
};
use flora_application::resilience::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};

use crate::constants::{PRIMARY_TIMEOUT_MS, SECONDARY_TIMEOUT_MS};

/// Which adapter fills a provider slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    PlantId,
    PlantNet,
    /// Slot always fails; the other provider carries every request
    Disabled,
}

/// Circuit breaker thresholds of one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitConfig {
    pub failure_threshold: u32,
    pub reset_timeout_secs: u64,
    pub success_threshold: u32,
    /// Trial calls allowed while half-open; defaults to `success_threshold`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_open_max_calls: Option<u32>,
}

impl CircuitConfig {
    pub fn primary() -> Self {
        Self {
            failure_threshold: PRIMARY_FAILURE_THRESHOLD,
            reset_timeout_secs: PRIMARY_RESET_TIMEOUT.as_secs(),
            success_threshold: CIRCUIT_SUCCESS_THRESHOLD,
            half_open_max_calls: None,
        }
    }

    pub fn secondary() -> Self {
        Self {
            failure_threshold: SECONDARY_FAILURE_THRESHOLD,
            reset_timeout_secs: SECONDARY_RESET_TIMEOUT.as_secs(),
            success_threshold: CIRCUIT_SUCCESS_THRESHOLD,
            half_open_max_calls: None,
        }
    }

    pub fn to_breaker_config(&self) -> CircuitBreakerConfig {
        let config = CircuitBreakerConfig::new(
            self.failure_threshold,
            Duration::from_secs(self.reset_timeout_secs),
            self.success_threshold,
        );
        match self.half_open_max_calls {
            Some(calls) => config.with_half_open_max_calls(calls),
            None => config,
        }
    }
}

/// One provider slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Override of the adapter's default endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,

    pub circuit: CircuitConfig,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_disabled(&self) -> bool {
        self.kind == ProviderKind::Disabled
    }
}

/// Primary and secondary provider slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub primary: ProviderConfig,
    pub secondary: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            primary: ProviderConfig {
                kind: ProviderKind::PlantId,
                base_url: None,
                api_key: None,
                timeout_ms: PRIMARY_TIMEOUT_MS,
                circuit: CircuitConfig::primary(),
            },
            secondary: ProviderConfig {
                kind: ProviderKind::PlantNet,
                base_url: None,
                api_key: None,
                timeout_ms: SECONDARY_TIMEOUT_MS,
                circuit: CircuitConfig::secondary(),
            },
        }
    }
}

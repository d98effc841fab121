//! Domain events
//!
//! Events emitted by the identification core so that health reporting and
//! metrics collectors can observe it without coupling to it.

use serde::{Deserialize, Serialize};

use crate::value_objects::{CircuitStatus, Completeness};

/// How a request's result was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrigin {
    /// Served from the cache without calling providers
    Cache,
    /// Produced by calling providers
    Providers,
}

/// System-wide event types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A provider's circuit breaker changed status
    CircuitStateChanged {
        provider: String,
        from: CircuitStatus,
        to: CircuitStatus,
    },
    /// An identification request produced a result
    IdentificationCompleted {
        content_key: String,
        completeness: Completeness,
        origin: ResultOrigin,
        elapsed_ms: u64,
    },
    /// An identification request failed on every provider
    IdentificationFailed {
        content_key: String,
        failed_providers: usize,
    },
}

impl DomainEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::CircuitStateChanged { .. } => "circuit_state_changed",
            Self::IdentificationCompleted { .. } => "identification_completed",
            Self::IdentificationFailed { .. } => "identification_failed",
        }
    }
}

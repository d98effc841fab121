//! Circuit breaker status shared by events and health snapshots

use std::fmt;

use serde::{Deserialize, Serialize};

/// Circuit breaker status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CircuitStatus {
    /// Calls pass through
    #[default]
    Closed,
    /// Calls are rejected without contacting the provider
    Open,
    /// A limited number of trial calls probe recovery
    HalfOpen,
}

impl fmt::Display for CircuitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

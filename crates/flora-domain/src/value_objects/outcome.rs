//! Provider outcomes and the merged identification

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content_key::ContentKey;
use super::payload::{CareAttributes, DiseaseFlag, IdentificationPayload, PlantSuggestion};

/// Role a provider plays in the merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderRole {
    /// Higher-accuracy provider; its identification is authoritative
    Primary,
    /// Supplementary provider; fills care and taxonomy gaps
    Secondary,
}

impl fmt::Display for ProviderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// Why a provider produced no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFailureKind {
    /// The call did not complete within its timeout
    Timeout,
    /// The provider reported quota / rate exhaustion
    RateLimited,
    /// The provider failed (5xx, auth, transport, unparseable response)
    ServerError,
    /// The provider rejected the input itself
    InvalidInput,
    /// The circuit breaker rejected the call; the provider was not contacted
    CircuitOpen,
    /// The worker pool had no free slot; the provider was not contacted
    PoolExhausted,
}

impl ProviderFailureKind {
    /// Whether this outcome says the provider itself is unhealthy
    pub fn counts_against_provider(&self) -> bool {
        matches!(self, Self::Timeout | Self::RateLimited | Self::ServerError)
    }
}

impl fmt::Display for ProviderFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidInput => "invalid_input",
            Self::CircuitOpen => "circuit_open",
            Self::PoolExhausted => "pool_exhausted",
        };
        f.write_str(name)
    }
}

/// Typed provider failure with a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub kind: ProviderFailureKind,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(kind: ProviderFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderFailureKind::Timeout, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderFailureKind::RateLimited, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ProviderFailureKind::ServerError, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ProviderFailureKind::InvalidInput, message)
    }

    pub fn circuit_open(message: impl Into<String>) -> Self {
        Self::new(ProviderFailureKind::CircuitOpen, message)
    }

    pub fn pool_exhausted(message: impl Into<String>) -> Self {
        Self::new(ProviderFailureKind::PoolExhausted, message)
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of one provider call
pub type ProviderResult = Result<IdentificationPayload, ProviderFailure>;

/// Failure attributed to a named provider, surfaced in `TotalFailure`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailureReport {
    pub provider: String,
    pub role: ProviderRole,
    pub failure: ProviderFailure,
}

/// Per-provider line of the merged result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub provider: String,
    pub role: ProviderRole,
    /// `None` when the provider contributed data
    pub failure: Option<ProviderFailure>,
    pub elapsed_ms: u64,
}

impl SourceReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Whether both providers contributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// The primary provider contributed the identification
    Complete,
    /// Only the secondary provider contributed
    Partial,
}

/// Confidence the caller should attach to the identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Standard,
    Reduced,
}

/// Merged identification returned to the caller and stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedIdentification {
    pub content_key: ContentKey,
    /// `false` is the "no plant detected" outcome, not a failure
    pub plant_detected: bool,
    pub suggestions: Vec<PlantSuggestion>,
    pub care: CareAttributes,
    pub diseases: Vec<DiseaseFlag>,
    pub completeness: Completeness,
    pub confidence: ConfidenceLevel,
    pub sources: Vec<SourceReport>,
    pub merged_at: DateTime<Utc>,
}

impl MergedIdentification {
    /// Build a result from a single payload with no supplementation
    pub fn from_payload(
        content_key: ContentKey,
        payload: IdentificationPayload,
        completeness: Completeness,
        sources: Vec<SourceReport>,
    ) -> Self {
        let confidence = match completeness {
            Completeness::Complete => ConfidenceLevel::Standard,
            Completeness::Partial => ConfidenceLevel::Reduced,
        };
        Self {
            content_key,
            plant_detected: payload.plant_detected,
            suggestions: payload.suggestions,
            care: payload.care,
            diseases: payload.diseases,
            completeness,
            confidence,
            sources,
            merged_at: Utc::now(),
        }
    }

    pub fn is_partial(&self) -> bool {
        self.completeness == Completeness::Partial
    }

    pub fn top_suggestion(&self) -> Option<&PlantSuggestion> {
        self.suggestions.first()
    }
}

//! Domain Value Objects
//!
//! Immutable value objects that represent concepts in the identification
//! domain. Value objects are defined by their attributes and compare by value.
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`IdentificationRequest`] | Uploaded image, options and derived content key |
//! | [`ContentKey`] | Content-addressed cache key |
//! | [`IdentificationPayload`] | Normalized provider success payload |
//! | [`ProviderFailure`] | Typed provider failure |
//! | [`MergedIdentification`] | Merged result returned to callers |
//! | [`CircuitStatus`] | Circuit breaker status |

/// Circuit breaker status
pub mod circuit;
/// Content-addressed keys
pub mod content_key;
/// Identification options
pub mod options;
/// Provider outcomes and merged result
pub mod outcome;
/// Normalized provider payloads
pub mod payload;
/// Identification request
pub mod request;

pub use circuit::CircuitStatus;
pub use content_key::ContentKey;
pub use options::{IdentificationOption, IdentificationOptions};
pub use outcome::{
    Completeness, ConfidenceLevel, MergedIdentification, ProviderFailure, ProviderFailureKind,
    ProviderFailureReport, ProviderResult, ProviderRole, SourceReport,
};
pub use payload::{CareAttributes, DiseaseFlag, IdentificationPayload, PlantSuggestion, Taxonomy};
pub use request::IdentificationRequest;

//! # Flora
//!
//! Plant identification orchestration core. Fans each request out to a
//! primary and a secondary identification provider, isolates failing
//! providers behind circuit breakers, and shares merged results through a
//! content-addressed cache that collapses concurrent identical requests
//! into one set of upstream calls.
//!
//! ## Example
//!
//! ```ignore
//! use flora::infrastructure::{ConfigLoader, build_context};
//! use flora::domain::{IdentificationOptions, IdentificationRequest};
//!
//! let config = ConfigLoader::new().load()?;
//! let context = build_context(config)?;
//!
//! let request = IdentificationRequest::new(image_bytes, IdentificationOptions::new())?;
//! let merged = context.service.identify(&request).await?;
//! println!("{}", serde_json::to_string_pretty(&merged)?);
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Value objects, errors, events and port traits
//! - `application` - Worker pool, circuit breakers, result cache, merge and orchestration
//! - `providers` - Plant.id and Pl@ntNet adapters, cache, lock and event backends
//! - `infrastructure` - Configuration, logging and service assembly

pub mod cli;

/// Domain layer - core types and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use flora_domain::*;
}

/// Application layer - orchestration and resilience
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use flora_application::*;
}

/// Provider implementations
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use flora_providers::*;
}

/// Infrastructure layer - config, logging and wiring
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use flora_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

pub use application::IdentificationService;
pub use infrastructure::{AppConfig, ConfigLoader, FloraContext, build_context};

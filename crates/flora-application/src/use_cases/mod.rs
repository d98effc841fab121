//! Use cases

pub mod identification_service;

pub use identification_service::{CachePolicy, IdentificationService, ProviderSlot};

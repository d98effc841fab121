//! Provider factories
//!
//! Turn configuration sections into port implementations from
//! `flora-providers`. This layer only wires; it implements nothing itself.

pub mod providers;

pub use providers::{
    CacheProviderFactory, IdentificationProviderFactory, LockProviderFactory, http_client,
};

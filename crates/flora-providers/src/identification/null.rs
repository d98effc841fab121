//! Null identification provider
//!
//! Stands in for a provider slot disabled in configuration. Every call fails
//! with `server_error`, so the slot's breaker eventually opens and the
//! provider stops being dispatched at all.

use std::time::Duration;

use async_trait::async_trait;
use flora_domain::constants::PROVIDER_NULL;
use flora_domain::ports::IdentificationProvider;
use flora_domain::value_objects::{IdentificationOptions, ProviderFailure, ProviderResult};

#[derive(Debug, Clone, Default)]
pub struct NullIdentificationProvider;

impl NullIdentificationProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentificationProvider for NullIdentificationProvider {
    async fn identify(
        &self,
        _image: &[u8],
        _options: &IdentificationOptions,
        _timeout: Duration,
    ) -> ProviderResult {
        Err(ProviderFailure::server_error("provider disabled"))
    }

    fn provider_name(&self) -> &str {
        PROVIDER_NULL
    }
}

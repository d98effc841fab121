//! Identification Provider Port
//!
//! Port for the external plant identification services. Each adapter turns
//! raw image bytes plus options into a normalized payload or a typed failure.

use std::time::Duration;

use async_trait::async_trait;

use crate::value_objects::{IdentificationOptions, ProviderResult};

/// Identification Provider Port
///
/// # Contract
///
/// - The supplied `timeout` is honored; a call that runs past it resolves to
///   [`ProviderFailureKind::Timeout`](crate::value_objects::ProviderFailureKind::Timeout).
/// - No internal retries. Retrying is the circuit breaker's business.
/// - Only `timeout`, `rate_limited`, `server_error` and `invalid_input`
///   failures are produced here; `circuit_open` and `pool_exhausted` belong to
///   the orchestrator.
///
/// # Implementations
///
/// - **Plant.id**: primary, JSON + base64 upload
/// - **Pl@ntNet**: secondary, multipart upload
/// - **Null**: disabled slot, always fails
#[async_trait]
pub trait IdentificationProvider: Send + Sync + std::fmt::Debug {
    /// Identify the plant in `image`
    async fn identify(
        &self,
        image: &[u8],
        options: &IdentificationOptions,
        timeout: Duration,
    ) -> ProviderResult;

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}

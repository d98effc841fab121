//! Identification Service Use Case
//!
//! Orchestrates one identification request: cache lookup with stampede
//! prevention, circuit checks, parallel dispatch of both providers on the
//! worker pool, per-branch timeouts, breaker feedback and merge.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use flora_domain::error::{Error, Result};
use flora_domain::events::{DomainEvent, ResultOrigin};
use flora_domain::ports::{IdentificationProvider, SharedEventBus};
use flora_domain::value_objects::{
    IdentificationRequest, MergedIdentification, ProviderFailure, ProviderResult, ProviderRole,
};
use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::cache::{ResultCache, ResultCacheStats};
use crate::constants::{PARTIAL_RESULT_TTL, RESULT_TTL};
use crate::merge::{BranchOutcome, merge};
use crate::pool::{WorkerPool, WorkerPoolStats};
use crate::resilience::{CircuitBreaker, CircuitSnapshot};

/// A provider together with its breaker and timeout
#[derive(Debug, Clone)]
pub struct ProviderSlot {
    pub provider: Arc<dyn IdentificationProvider>,
    pub breaker: Arc<CircuitBreaker>,
    pub timeout: Duration,
}

impl ProviderSlot {
    pub fn new(
        provider: Arc<dyn IdentificationProvider>,
        breaker: Arc<CircuitBreaker>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            breaker,
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        self.provider.provider_name()
    }
}

/// Which merged results get cached, and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub enabled: bool,
    /// TTL of complete results
    pub ttl: Duration,
    /// TTL of partial results
    pub partial_ttl: Duration,
}

impl CachePolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn ttl_for(&self, merged: &MergedIdentification) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        Some(if merged.is_partial() {
            self.partial_ttl
        } else {
            self.ttl
        })
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: RESULT_TTL,
            partial_ttl: PARTIAL_RESULT_TTL,
        }
    }
}

/// Identification orchestrator
pub struct IdentificationService {
    primary: ProviderSlot,
    secondary: ProviderSlot,
    pool: Arc<WorkerPool>,
    cache: Arc<ResultCache>,
    policy: CachePolicy,
    events: Option<SharedEventBus>,
}

impl IdentificationService {
    pub fn new(
        primary: ProviderSlot,
        secondary: ProviderSlot,
        pool: Arc<WorkerPool>,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self {
            primary,
            secondary,
            pool,
            cache,
            policy: CachePolicy::default(),
            events: None,
        }
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_events(mut self, events: SharedEventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Identify the plant in `request`
    ///
    /// Returns a partial result when only the secondary provider answered and
    /// [`Error::TotalFailure`] when neither did. A result whose
    /// `plant_detected` is false is a success.
    #[instrument(skip_all, fields(key = %request.content_key().short()))]
    pub async fn identify(&self, request: &IdentificationRequest) -> Result<MergedIdentification> {
        let started = Instant::now();
        let key = request.content_key().as_str();

        let lookup = self
            .cache
            .get_or_fill(key, || self.run_providers(request))
            .await;

        let elapsed_ms = elapsed_ms(started);
        match lookup {
            Ok(lookup) => {
                let origin = if lookup.source.is_hit() {
                    ResultOrigin::Cache
                } else {
                    ResultOrigin::Providers
                };
                info!(
                    source = ?lookup.source,
                    completeness = ?lookup.value.completeness,
                    elapsed_ms,
                    "Identification completed"
                );
                self.publish(DomainEvent::IdentificationCompleted {
                    content_key: key.to_string(),
                    completeness: lookup.value.completeness,
                    origin,
                    elapsed_ms,
                });
                Ok(lookup.value)
            }
            Err(e) => {
                if let Error::TotalFailure { failures } = &e {
                    warn!(elapsed_ms, failed = failures.len(), "Identification failed on every provider");
                    self.publish(DomainEvent::IdentificationFailed {
                        content_key: key.to_string(),
                        failed_providers: failures.len(),
                    });
                }
                Err(e)
            }
        }
    }

    /// Breaker health of both providers, primary first
    pub fn circuit_snapshots(&self) -> Vec<CircuitSnapshot> {
        vec![
            self.primary.breaker.snapshot(),
            self.secondary.breaker.snapshot(),
        ]
    }

    pub fn cache_stats(&self) -> ResultCacheStats {
        self.cache.stats()
    }

    pub fn pool_stats(&self) -> WorkerPoolStats {
        self.pool.stats()
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    // ------------------------------------------------------------------------

    async fn run_providers(
        &self,
        request: &IdentificationRequest,
    ) -> Result<(MergedIdentification, Option<Duration>)> {
        let (primary, secondary) = tokio::join!(
            self.dispatch(&self.primary, ProviderRole::Primary, request),
            self.dispatch(&self.secondary, ProviderRole::Secondary, request),
        );
        let merged = merge(request.content_key(), primary, secondary)?;
        let ttl = self.policy.ttl_for(&merged);
        Ok((merged, ttl))
    }

    async fn dispatch(
        &self,
        slot: &ProviderSlot,
        role: ProviderRole,
        request: &IdentificationRequest,
    ) -> BranchOutcome {
        let started = Instant::now();
        let name = slot.name().to_string();

        if let Err(e) = slot.breaker.allow() {
            debug!(provider = %name, "Skipping provider, circuit open");
            return BranchOutcome::new(
                name,
                role,
                Err(ProviderFailure::circuit_open(e.to_string())),
                started.elapsed(),
            );
        }

        let task = run_branch(
            Arc::clone(&slot.provider),
            Arc::clone(&slot.breaker),
            request.clone(),
            slot.timeout,
        );

        let result = match self.pool.submit(task) {
            Ok(handle) => match handle.join().await {
                Ok(result) => result,
                Err(e) => {
                    slot.breaker.record_failure();
                    Err(ProviderFailure::server_error(e.to_string()))
                }
            },
            Err(e) => {
                slot.breaker.release();
                warn!(provider = %name, "Worker pool exhausted, provider not called");
                Err(ProviderFailure::pool_exhausted(e.to_string()))
            }
        };

        BranchOutcome::new(name, role, result, started.elapsed())
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(events) = &self.events {
            if let Err(e) = events.publish_event(event) {
                debug!(error = %e, "Failed to publish identification event");
            }
        }
    }
}

impl std::fmt::Debug for IdentificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentificationService")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .field("pool", &self.pool)
            .field("cache", &self.cache)
            .field("policy", &self.policy)
            .finish()
    }
}

/// One provider call, run on the pool
///
/// Feeds the breaker before returning so the outcome is recorded even when
/// the requester has stopped waiting.
async fn run_branch(
    provider: Arc<dyn IdentificationProvider>,
    breaker: Arc<CircuitBreaker>,
    request: IdentificationRequest,
    timeout: Duration,
) -> ProviderResult {
    let started = Instant::now();
    let call = AssertUnwindSafe(provider.identify(request.image(), request.options(), timeout))
        .catch_unwind();

    let result = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(ProviderFailure::server_error("provider call panicked")),
        Err(_) => Err(ProviderFailure::timeout(format!(
            "no response within {}ms",
            timeout.as_millis()
        ))),
    };

    match &result {
        Ok(_) => breaker.record_success(),
        Err(failure) if failure.kind.counts_against_provider() => breaker.record_failure(),
        Err(_) => breaker.release(),
    }

    debug!(
        provider = provider.provider_name(),
        ok = result.is_ok(),
        elapsed_ms = elapsed_ms(started),
        "Provider call finished"
    );
    result
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

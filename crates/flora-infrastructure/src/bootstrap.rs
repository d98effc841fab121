//! Service assembly
//!
//! Builds every component the identification service needs from an
//! [`AppConfig`]: adapters, breakers, stores, the process-wide worker pool
//! and the event bus.

use std::sync::Arc;

use flora_application::cache::ResultCache;
use flora_application::pool::{WorkerPool, global_pool_with};
use flora_application::resilience::CircuitBreaker;
use flora_application::use_cases::{IdentificationService, ProviderSlot};
use flora_domain::error::Result;
use flora_domain::ports::SharedEventBus;
use flora_providers::events::TokioEventBusProvider;
use reqwest::Client;
use tracing::info;

use crate::config::{AppConfig, ProviderConfig};
use crate::factory::{
    CacheProviderFactory, IdentificationProviderFactory, LockProviderFactory, http_client,
};
use crate::utils::TimedOperation;

/// Everything a binary needs to serve identification requests
#[derive(Debug, Clone)]
pub struct FloraContext {
    pub config: AppConfig,
    pub service: Arc<IdentificationService>,
    pub events: SharedEventBus,
    pub pool: Arc<WorkerPool>,
}

/// Wire the identification service from configuration
///
/// Uses the process-wide worker pool; its size is taken from `config` only
/// if this is the first time the pool is requested.
pub fn build_context(config: AppConfig) -> Result<FloraContext> {
    let timer = TimedOperation::start();
    let events: SharedEventBus = TokioEventBusProvider::new_shared();
    let client = http_client()?;

    let primary = build_slot(&config.providers.primary, client.clone(), &events)?;
    let secondary = build_slot(&config.providers.secondary, client, &events)?;

    let store = CacheProviderFactory::create(&config.cache)?;
    let locks = LockProviderFactory::create(&config.lock, config.cache.redis_url.as_deref())?;
    let cache = Arc::new(
        ResultCache::new(store, locks, config.lock.to_stampede_config())
            .with_namespace(config.cache.namespace.clone()),
    );

    let pool = global_pool_with(config.pool.to_worker_pool_config());

    info!(
        primary = primary.name(),
        secondary = secondary.name(),
        cache = cache.store_name(),
        lock = cache.lock_name(),
        pool_size = pool.capacity(),
        elapsed_ms = timer.elapsed_ms(),
        "Identification service ready"
    );

    let service = IdentificationService::new(primary, secondary, Arc::clone(&pool), cache)
        .with_cache_policy(config.cache.to_policy())
        .with_events(Arc::clone(&events));

    Ok(FloraContext {
        config,
        service: Arc::new(service),
        events,
        pool,
    })
}

fn build_slot(
    config: &ProviderConfig,
    client: Client,
    events: &SharedEventBus,
) -> Result<ProviderSlot> {
    let provider = IdentificationProviderFactory::create(config, client)?;
    let breaker = CircuitBreaker::new(provider.provider_name(), config.circuit.to_breaker_config())
        .with_events(Arc::clone(events));
    Ok(ProviderSlot::new(provider, Arc::new(breaker), config.timeout()))
}

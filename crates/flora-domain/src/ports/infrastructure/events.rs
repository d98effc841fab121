//! Event Bus Provider Port
//!
//! Publish/subscribe contract for [`DomainEvent`]s. Publishing never blocks
//! and never fails the caller's operation: it is called from the circuit
//! breaker and the orchestrator on the hot path.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;
use crate::events::DomainEvent;

/// Boxed async stream of domain events
pub type DomainEventStream = Pin<Box<dyn Stream<Item = DomainEvent> + Send + Sync + 'static>>;

/// Event bus provider interface for typed event pub/sub
#[async_trait]
pub trait EventBusProvider: Send + Sync + std::fmt::Debug {
    /// Publish a typed domain event to every current subscriber
    fn publish_event(&self, event: DomainEvent) -> Result<()>;

    /// Subscribe to receive typed domain events
    async fn subscribe_events(&self) -> Result<DomainEventStream>;

    /// Check if there are any active event subscribers
    fn has_subscribers(&self) -> bool;
}

/// Shared event bus handle
pub type SharedEventBus = Arc<dyn EventBusProvider>;

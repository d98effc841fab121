//! Null event bus
//!
//! Discards all events. Useful when nothing observes the core.

use std::sync::Arc;

use async_trait::async_trait;
use flora_domain::error::Result;
use flora_domain::events::DomainEvent;
use flora_domain::ports::{DomainEventStream, EventBusProvider};
use futures::stream;

#[derive(Debug, Clone, Default)]
pub struct NullEventBusProvider;

impl NullEventBusProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl EventBusProvider for NullEventBusProvider {
    fn publish_event(&self, _event: DomainEvent) -> Result<()> {
        Ok(())
    }

    async fn subscribe_events(&self) -> Result<DomainEventStream> {
        Ok(Box::pin(stream::empty()))
    }

    fn has_subscribers(&self) -> bool {
        false
    }
}

//! Tokio Broadcast Event Bus Provider
//!
//! In-process event distribution over a tokio broadcast channel. Events are
//! ephemeral: a subscriber sees only what is published after it subscribed,
//! and a slow subscriber loses the oldest events once the channel is full.

use std::sync::Arc;

use async_trait::async_trait;
use flora_domain::error::Result;
use flora_domain::events::DomainEvent;
use flora_domain::ports::{DomainEventStream, EventBusProvider};
use futures::stream;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::constants::EVENT_BUS_DEFAULT_CAPACITY;

/// Event bus provider using tokio broadcast channels
#[derive(Clone)]
pub struct TokioEventBusProvider {
    sender: Arc<broadcast::Sender<DomainEvent>>,
    capacity: usize,
}

impl TokioEventBusProvider {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_BUS_DEFAULT_CAPACITY)
    }

    /// Create with a custom channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
            capacity: capacity.max(1),
        }
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TokioEventBusProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokioEventBusProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioEventBusProvider")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[async_trait]
impl EventBusProvider for TokioEventBusProvider {
    fn publish_event(&self, event: DomainEvent) -> Result<()> {
        let name = event.name();
        match self.sender.send(event) {
            Ok(count) => debug!(event = name, subscribers = count, "Published event"),
            Err(_) => debug!(event = name, "Published event but no subscribers"),
        }
        Ok(())
    }

    async fn subscribe_events(&self) -> Result<DomainEventStream> {
        let receiver = self.sender.subscribe();

        let stream = stream::unfold(receiver, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Event stream lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(Box::pin(stream))
    }

    fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

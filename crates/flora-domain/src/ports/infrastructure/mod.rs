//! Infrastructure Ports

pub mod events;
pub mod lock;

pub use events::{DomainEventStream, EventBusProvider, SharedEventBus};
pub use lock::{LockGuard, LockProvider};

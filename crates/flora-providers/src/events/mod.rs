//! Event Bus Provider Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | NullEventBusProvider | Testing | Discards all events |
//! | TokioEventBusProvider | In-Process | Tokio broadcast channels |

pub mod null;
pub mod tokio;

pub use null::NullEventBusProvider;
pub use self::tokio::TokioEventBusProvider;

pub use flora_domain::events::DomainEvent;
pub use flora_domain::ports::{DomainEventStream, EventBusProvider};

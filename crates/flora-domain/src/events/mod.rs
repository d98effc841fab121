//! Domain events

pub mod domain_events;

pub use domain_events::{DomainEvent, ResultOrigin};

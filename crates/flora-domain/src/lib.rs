//! # Flora Domain Layer
//!
//! Core types of the plant identification orchestration core. This crate has
//! no runtime dependencies on I/O: it defines what an identification request
//! is, what providers return, how failures are classified, and the ports the
//! outer layers implement.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`value_objects`] | Requests, content keys, payloads, merged results |
//! | [`ports`] | Identification, cache, lock and event bus traits |
//! | [`events`] | Domain events |
//! | [`error`] | Error type and `Result` alias |
//! | [`constants`] | Domain constants |

pub mod constants;
pub mod error;
pub mod events;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use events::DomainEvent;
pub use value_objects::*;

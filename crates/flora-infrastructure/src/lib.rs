//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns for Flora: configuration loading and
//! validation, logging setup, and the wiring that turns an [`AppConfig`]
//! into a ready [`IdentificationService`](flora_application::IdentificationService).
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based configuration (defaults, TOML, `FLORA__*` env) |
//! | [`logging`] | Structured logging with tracing |
//! | [`factory`] | Provider, cache and lock factories |
//! | [`bootstrap`] | Service assembly from configuration |
//! | [`constants`] | Infrastructure defaults |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod factory;
pub mod logging;
pub mod utils;

pub use bootstrap::{FloraContext, build_context};
pub use config::{AppConfig, ConfigLoader};
pub use error_ext::ErrorContext;
pub use utils::TimedOperation;

//! Application Layer - Flora
//!
//! Orchestration core of the plant identification platform. Everything here
//! is written against the ports declared in `flora-domain`; concrete stores
//! and provider clients are plugged in by `flora-infrastructure`.
//!
//! ## Components
//!
//! - [`pool`]: bounded, non-blocking worker pool and its process-wide instance
//! - [`resilience`]: per-provider circuit breaker
//! - [`cache`]: content-addressed result cache with stampede prevention
//! - [`merge`]: primary/secondary merge policy
//! - [`use_cases`]: the identification service tying them together

pub mod cache;
pub mod constants;
pub mod merge;
pub mod pool;
pub mod resilience;
pub mod use_cases;

pub use cache::*;
pub use pool::*;
pub use resilience::*;
pub use use_cases::*;

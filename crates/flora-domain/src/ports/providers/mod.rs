//! External Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | [`IdentificationProvider`] | Plant identification services |
//! | [`CacheProvider`] | Shared result store |

pub mod cache;
pub mod identification;

pub use cache::{CacheEntryConfig, CacheProvider, CacheStats};
pub use identification::IdentificationProvider;

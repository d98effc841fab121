//! Stampede Lock Port
//!
//! Key-scoped, expiring mutual exclusion used only to serialize cache fills.
//! A lock is never a correctness guarantee: it expires on its own so a
//! crashed holder cannot wedge a key.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Proof of a held lock
///
/// The token is unique per acquisition, so a holder whose lock already
/// expired and was re-acquired elsewhere cannot release the new holder's lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockGuard {
    pub key: String,
    pub token: String,
}

impl LockGuard {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
        }
    }
}

/// Lock Provider Port
#[async_trait]
pub trait LockProvider: Send + Sync + std::fmt::Debug {
    /// Try once to take the lock for `key`
    ///
    /// Returns `Ok(None)` when another holder has it. An `Err` means the
    /// lock store itself is unavailable.
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockGuard>>;

    /// Release a held lock; false if it had already expired or changed hands
    async fn release(&self, guard: &LockGuard) -> Result<bool>;

    /// Provider identifier ("memory", "redis", "null")
    fn provider_name(&self) -> &str;
}

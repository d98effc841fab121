//! Null lock provider
//!
//! Every acquisition succeeds immediately. Selected when stampede prevention
//! is not wanted; concurrent identical requests then each fill on their own.

use std::time::Duration;

use async_trait::async_trait;
use flora_domain::error::Result;
use flora_domain::ports::{LockGuard, LockProvider};

#[derive(Debug, Clone, Default)]
pub struct NullLockProvider;

impl NullLockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LockProvider for NullLockProvider {
    async fn try_acquire(&self, key: &str, _ttl: Duration) -> Result<Option<LockGuard>> {
        Ok(Some(LockGuard::new(key, "null")))
    }

    async fn release(&self, _guard: &LockGuard) -> Result<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}

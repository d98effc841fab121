//! In-process stampede lock
//!
//! Key-scoped locks held in a `DashMap`. Suitable for a single instance; a
//! multi-instance deployment needs the Redis lock to collapse fills across
//! processes.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use flora_domain::error::Result;
use flora_domain::ports::{LockGuard, LockProvider};
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct HeldLock {
    token: String,
    expires_at: Instant,
}

/// In-memory lock provider with expiring entries
#[derive(Debug, Default)]
pub struct MemoryLockProvider {
    locks: DashMap<String, HeldLock>,
}

impl MemoryLockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) locks
    pub fn held(&self) -> usize {
        let now = Instant::now();
        self.locks.iter().filter(|l| l.expires_at > now).count()
    }
}

#[async_trait]
impl LockProvider for MemoryLockProvider {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockGuard>> {
        let now = Instant::now();
        let token = Uuid::new_v4().to_string();
        let fresh = HeldLock {
            token: token.clone(),
            expires_at: now + ttl,
        };

        let acquired = match self.locks.entry(key.to_string()) {
            Entry::Occupied(mut held) => {
                if held.get().expires_at <= now {
                    held.insert(fresh);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(fresh);
                true
            }
        };

        Ok(acquired.then(|| LockGuard::new(key, token)))
    }

    async fn release(&self, guard: &LockGuard) -> Result<bool> {
        let now = Instant::now();
        let removed = self
            .locks
            .remove_if(&guard.key, |_, held| held.token == guard.token);
        Ok(removed.is_some_and(|(_, held)| held.expires_at > now))
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

//! Content-addressed result cache with stampede prevention
//!
//! Wraps a [`CacheProvider`] and a [`LockProvider`] and implements the
//! check-lock-check fill protocol:
//!
//! 1. cache hit → return, no lock
//! 2. miss → try the key's lock every `poll_interval` for `acquire_timeout`
//! 3. lock held → check again; still a miss → fill, write, release
//! 4. lock not obtained → poll the cache for `poll_timeout`, retrying the lock
//!    on every tick; take over the fill if the lock frees up, otherwise fill
//!    directly once the wait runs out
//!
//! Store failures never reach the caller. A broken cache reads as a miss and
//! a broken lock store degrades to a direct fill. Direct fills are jittered
//! and bounded by a process-local semaphore.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use flora_domain::error::Error;
use flora_domain::ports::{CacheEntryConfig, CacheProvider, LockGuard, LockProvider};
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::constants::{
    DIRECT_FILL_JITTER, DIRECT_FILL_PERMITS, LOCK_ACQUIRE_TIMEOUT, LOCK_KEY_SUFFIX,
    LOCK_POLL_INTERVAL, LOCK_POLL_TIMEOUT, LOCK_TTL,
};

/// Timings of the stampede protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampedeConfig {
    /// Expiry of a held lock; must outlast the slowest fill
    pub lock_ttl: Duration,
    /// How long to keep trying to take the lock
    pub acquire_timeout: Duration,
    /// Retry and poll period
    pub poll_interval: Duration,
    /// How long a non-holder polls the cache before filling directly
    pub poll_timeout: Duration,
    /// Concurrent direct fills per process
    pub direct_fill_permits: usize,
    /// Upper bound of the random delay before a direct fill
    pub direct_fill_jitter: Duration,
}

impl Default for StampedeConfig {
    fn default() -> Self {
        Self {
            lock_ttl: LOCK_TTL,
            acquire_timeout: LOCK_ACQUIRE_TIMEOUT,
            poll_interval: LOCK_POLL_INTERVAL,
            poll_timeout: LOCK_POLL_TIMEOUT,
            direct_fill_permits: DIRECT_FILL_PERMITS,
            direct_fill_jitter: DIRECT_FILL_JITTER,
        }
    }
}

/// Where a value returned by [`ResultCache::get_or_fill`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSource {
    /// First read hit
    Hit,
    /// Hit on the re-check after taking the lock
    HitAfterLock,
    /// Hit while waiting on another holder, or on the direct-fill re-check
    HitAfterPoll,
    /// Filled while holding the lock
    Filled,
    /// Filled without the lock
    Direct,
}

impl CacheSource {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit | Self::HitAfterLock | Self::HitAfterPoll)
    }
}

/// A value together with its origin
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup<T> {
    pub value: T,
    pub source: CacheSource,
}

/// Counters of the fill protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fills: u64,
    pub direct_fills: u64,
    pub lock_contended: u64,
    pub store_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fills: AtomicU64,
    direct_fills: AtomicU64,
    lock_contended: AtomicU64,
    store_errors: AtomicU64,
}

enum LockAttempt {
    Held(LockGuard),
    Contended,
    StoreDown,
}

enum Wait<T> {
    Published(T),
    Acquired(LockGuard),
    GaveUp,
}

/// Result cache over a shared store
pub struct ResultCache {
    store: Arc<dyn CacheProvider>,
    locks: Arc<dyn LockProvider>,
    config: StampedeConfig,
    namespace: Option<String>,
    direct_fill: Semaphore,
    counters: Counters,
}

impl ResultCache {
    pub fn new(
        store: Arc<dyn CacheProvider>,
        locks: Arc<dyn LockProvider>,
        config: StampedeConfig,
    ) -> Self {
        Self {
            direct_fill: Semaphore::new(config.direct_fill_permits.max(1)),
            store,
            locks,
            config,
            namespace: None,
            counters: Counters::default(),
        }
    }

    /// Prefix every store key with `namespace:`
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    pub fn config(&self) -> &StampedeConfig {
        &self.config
    }

    /// Read a value; store failures and undecodable entries read as a miss
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.lookup(&self.store_key(key)).await
    }

    /// Write a value; store failures are logged and ignored
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        self.write(&self.store_key(key), value, ttl).await;
    }

    /// Return the cached value for `key`, or run `fill` at most once per lock window
    ///
    /// `fill` yields the value and its TTL; `None` means "do not cache".
    /// Errors from `fill` are returned unchanged and nothing is written.
    pub async fn get_or_fill<T, E, F, Fut>(
        &self,
        key: &str,
        fill: F,
    ) -> std::result::Result<CacheLookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(T, Option<Duration>), E>>,
    {
        let key = self.store_key(key);
        let key = key.as_ref();

        if let Some(value) = self.lookup(key).await {
            return Ok(CacheLookup {
                value,
                source: CacheSource::Hit,
            });
        }

        let lock_key = format!("{key}{LOCK_KEY_SUFFIX}");
        match self.acquire(&lock_key).await {
            LockAttempt::Held(guard) => {
                let outcome = self.fill_locked(key, fill).await;
                self.release(&guard).await;
                outcome
            }
            LockAttempt::Contended => {
                self.counters.lock_contended.fetch_add(1, Ordering::Relaxed);
                match self.wait_for_holder(key, &lock_key).await {
                    Wait::Published(value) => Ok(CacheLookup {
                        value,
                        source: CacheSource::HitAfterPoll,
                    }),
                    Wait::Acquired(guard) => {
                        debug!(key, "Previous holder left nothing cached, taking over the fill");
                        let outcome = self.fill_locked(key, fill).await;
                        self.release(&guard).await;
                        outcome
                    }
                    Wait::GaveUp => {
                        debug!(key, "Lock holder did not publish in time, filling directly");
                        self.fill_direct(key, fill).await
                    }
                }
            }
            LockAttempt::StoreDown => self.fill_direct(key, fill).await,
        }
    }

    pub fn stats(&self) -> ResultCacheStats {
        ResultCacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fills: self.counters.fills.load(Ordering::Relaxed),
            direct_fills: self.counters.direct_fills.load(Ordering::Relaxed),
            lock_contended: self.counters.lock_contended.load(Ordering::Relaxed),
            store_errors: self.counters.store_errors.load(Ordering::Relaxed),
        }
    }

    /// Name of the backing store
    pub fn store_name(&self) -> &str {
        self.store.provider_name()
    }

    pub fn lock_name(&self) -> &str {
        self.locks.provider_name()
    }

    // ------------------------------------------------------------------------

    fn store_key<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match &self.namespace {
            Some(namespace) => Cow::Owned(format!("{namespace}:{key}")),
            None => Cow::Borrowed(key),
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let found = self.read(key).await;
        if found.is_some() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache value");
                return;
            }
        };
        let entry = CacheEntryConfig::new().with_ttl(ttl);
        if let Err(e) = self.store.set_json(key, &json, entry).await {
            self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
            let e = Error::cache_unavailable(e.to_string());
            warn!(key, error = %e, "Cache write failed, continuing without caching");
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = match self.store.get_json(key).await {
            Ok(json) => json?,
            Err(e) => {
                self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
                let e = Error::cache_unavailable(e.to_string());
                warn!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    async fn acquire(&self, lock_key: &str) -> LockAttempt {
        let deadline = Instant::now() + self.config.acquire_timeout;
        loop {
            match self.locks.try_acquire(lock_key, self.config.lock_ttl).await {
                Ok(Some(guard)) => return LockAttempt::Held(guard),
                Ok(None) => {}
                Err(e) => {
                    self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
                    let e = Error::lock_unavailable(e.to_string());
                    warn!(key = lock_key, error = %e, "Lock store failed, degrading to direct fill");
                    return LockAttempt::StoreDown;
                }
            }
            if Instant::now() + self.config.poll_interval > deadline {
                return LockAttempt::Contended;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn release(&self, guard: &LockGuard) {
        match self.locks.release(guard).await {
            Ok(true) => {}
            Ok(false) => debug!(key = %guard.key, "Lock expired before release"),
            Err(e) => {
                self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %guard.key, error = %e, "Lock release failed, leaving it to expire");
            }
        }
    }

    /// Wait for the lock holder to publish
    ///
    /// The lock is retried on every tick: a holder that finished without
    /// caching anything (failed fill, uncacheable value) frees it, and the
    /// first waiter to take it runs the fill instead of sleeping out
    /// `poll_timeout`.
    async fn wait_for_holder<T: DeserializeOwned>(&self, key: &str, lock_key: &str) -> Wait<T> {
        let deadline = Instant::now() + self.config.poll_timeout;
        while Instant::now() < deadline {
            tokio::time::sleep(self.config.poll_interval).await;
            if let Some(value) = self.read(key).await {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Wait::Published(value);
            }
            match self.locks.try_acquire(lock_key, self.config.lock_ttl).await {
                Ok(Some(guard)) => return Wait::Acquired(guard),
                Ok(None) => {}
                Err(e) => {
                    self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
                    let e = Error::lock_unavailable(e.to_string());
                    warn!(key = lock_key, error = %e, "Lock store failed while waiting, degrading to direct fill");
                    return Wait::GaveUp;
                }
            }
        }
        Wait::GaveUp
    }

    async fn fill_locked<T, E, F, Fut>(
        &self,
        key: &str,
        fill: F,
    ) -> std::result::Result<CacheLookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(T, Option<Duration>), E>>,
    {
        if let Some(value) = self.read(key).await {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(CacheLookup {
                value,
                source: CacheSource::HitAfterLock,
            });
        }

        let (value, ttl) = fill().await?;
        self.counters.fills.fetch_add(1, Ordering::Relaxed);
        if let Some(ttl) = ttl {
            self.write(key, &value, ttl).await;
        }
        Ok(CacheLookup {
            value,
            source: CacheSource::Filled,
        })
    }

    async fn fill_direct<T, E, F, Fut>(
        &self,
        key: &str,
        fill: F,
    ) -> std::result::Result<CacheLookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(T, Option<Duration>), E>>,
    {
        let jitter = self.jitter();
        if !jitter.is_zero() {
            tokio::time::sleep(jitter).await;
        }

        let _permit = self.direct_fill_permit(key).await;

        if let Some(value) = self.read(key).await {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(CacheLookup {
                value,
                source: CacheSource::HitAfterPoll,
            });
        }

        let (value, ttl) = fill().await?;
        self.counters.direct_fills.fetch_add(1, Ordering::Relaxed);
        if let Some(ttl) = ttl {
            self.write(key, &value, ttl).await;
        }
        Ok(CacheLookup {
            value,
            source: CacheSource::Direct,
        })
    }

    async fn direct_fill_permit(&self, key: &str) -> Option<SemaphorePermit<'_>> {
        match tokio::time::timeout(self.config.poll_timeout, self.direct_fill.acquire()).await {
            Ok(Ok(permit)) => Some(permit),
            Ok(Err(_)) => None,
            Err(_) => {
                warn!(key, "Timed out waiting for a direct-fill permit, filling anyway");
                None
            }
        }
    }

    fn jitter(&self) -> Duration {
        let max = u64::try_from(self.config.direct_fill_jitter.as_millis()).unwrap_or(u64::MAX);
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max))
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("store", &self.store.provider_name())
            .field("locks", &self.locks.provider_name())
            .field("config", &self.config)
            .finish()
    }
}

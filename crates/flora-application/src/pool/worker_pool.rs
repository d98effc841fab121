//! Bounded worker pool
//!
//! Runs provider calls on tokio tasks while capping how many may be in flight
//! at once. Submission never waits: a full pool rejects immediately with
//! [`Error::PoolExhausted`] so the caller can degrade instead of queueing.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use flora_domain::error::{Error, Result};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::constants::{WORKER_POOL_DRAIN_TIMEOUT, WORKER_POOL_MAX_SIZE, WORKER_POOL_SLOTS_PER_CORE};

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of execution slots, already clamped to `[1, WORKER_POOL_MAX_SIZE]`
    pub size: usize,
    /// How long a draining shutdown waits for running tasks
    pub drain_timeout: Duration,
}

impl WorkerPoolConfig {
    /// Configuration with an explicit size (clamped)
    pub fn with_size(size: usize) -> Self {
        Self {
            size: Self::clamp_size(size),
            drain_timeout: WORKER_POOL_DRAIN_TIMEOUT,
        }
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// `min(4 × available cores, WORKER_POOL_MAX_SIZE)`
    pub fn default_size() -> usize {
        let cores = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self::clamp_size(cores.saturating_mul(WORKER_POOL_SLOTS_PER_CORE))
    }

    pub fn clamp_size(size: usize) -> usize {
        size.clamp(1, WORKER_POOL_MAX_SIZE)
    }
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self::with_size(Self::default_size())
    }
}

/// Point-in-time pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerPoolStats {
    pub capacity: usize,
    pub in_flight: usize,
    pub submitted: u64,
    pub rejected: u64,
    pub completed: u64,
    pub shutting_down: bool,
}

#[derive(Debug, Default)]
struct PoolCounters {
    submitted: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
}

/// Handle to a submitted task
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: JoinHandle<Option<T>>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task's output
    ///
    /// Resolves to an internal error if the task panicked or was cancelled by
    /// a pool shutdown.
    pub async fn join(self) -> Result<T> {
        match self.inner.await {
            Ok(Some(output)) => Ok(output),
            Ok(None) => Err(Error::internal("Task cancelled by worker pool shutdown")),
            Err(e) if e.is_panic() => Err(Error::internal(format!("Task panicked: {e}"))),
            Err(e) => Err(Error::internal(format!("Task aborted: {e}"))),
        }
    }

    /// Abort the task; its handle then resolves to an error
    pub fn abort(&self) {
        self.inner.abort();
    }
}

/// Bounded, non-blocking worker pool
pub struct WorkerPool {
    config: WorkerPoolConfig,
    slots: Arc<Semaphore>,
    tracker: TaskTracker,
    cancel_token: CancellationToken,
    accepting: AtomicBool,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    pub fn new(config: WorkerPoolConfig) -> Self {
        let size = WorkerPoolConfig::clamp_size(config.size);
        debug!(size, "Creating worker pool");
        Self {
            slots: Arc::new(Semaphore::new(size)),
            config: WorkerPoolConfig { size, ..config },
            tracker: TaskTracker::new(),
            cancel_token: CancellationToken::new(),
            accepting: AtomicBool::new(true),
            counters: Arc::new(PoolCounters::default()),
        }
    }

    /// Create as Arc for sharing
    pub fn new_shared(config: WorkerPoolConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    pub fn capacity(&self) -> usize {
        self.config.size
    }

    /// Submit a task, failing immediately if no slot is free
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F>(&self, task: F) -> Result<TaskHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if !self.accepting.load(Ordering::Acquire) || self.cancel_token.is_cancelled() {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(Error::pool_exhausted(self.capacity()));
        }

        let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() else {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            debug!(capacity = self.capacity(), "Worker pool exhausted");
            return Err(Error::pool_exhausted(self.capacity()));
        };

        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        let token = self.cancel_token.child_token();
        let counters = Arc::clone(&self.counters);

        let guarded = async move {
            let _permit = permit;
            let output = tokio::select! {
                biased;
                () = token.cancelled() => None,
                output = task => Some(output),
            };
            counters.completed.fetch_add(1, Ordering::Relaxed);
            output
        };

        let tracked = self.tracker.track_future(guarded);
        Ok(TaskHandle {
            inner: tokio::spawn(tracked),
        })
    }

    /// Stop accepting work and wind down
    ///
    /// With `drain`, running tasks get up to `drain_timeout` to finish before
    /// the remainder is cancelled. Without it, everything is cancelled at
    /// once. Returns `true` if every task finished on its own.
    pub async fn shutdown(&self, drain: bool) -> bool {
        self.accepting.store(false, Ordering::Release);
        self.tracker.close();
        info!(
            drain,
            in_flight = self.tracker.len(),
            "Shutting down worker pool"
        );

        if !drain {
            self.cancel_token.cancel();
            self.tracker.wait().await;
            return false;
        }

        let drained = tokio::select! {
            () = self.tracker.wait() => true,
            () = tokio::time::sleep(self.config.drain_timeout) => false,
        };

        if !drained {
            warn!(
                remaining = self.tracker.len(),
                "Drain timeout reached, cancelling remaining tasks"
            );
            self.cancel_token.cancel();
            self.tracker.wait().await;
        }
        drained
    }

    /// Cancel in-flight work without waiting
    pub fn cancel_all(&self) {
        self.accepting.store(false, Ordering::Release);
        self.tracker.close();
        self.cancel_token.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        !self.accepting.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> WorkerPoolStats {
        WorkerPoolStats {
            capacity: self.capacity(),
            in_flight: self.capacity() - self.slots.available_permits(),
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            shutting_down: self.is_shutting_down(),
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.config.size)
            .field("available", &self.slots.available_permits())
            .field("shutting_down", &self.is_shutting_down())
            .finish()
    }
}

//! Timing instrumentation helpers

use std::time::{Duration, Instant};

/// Tracks the elapsed time of one operation
///
/// # Example
///
/// ```ignore
/// use flora_infrastructure::utils::TimedOperation;
///
/// let timer = TimedOperation::start();
/// let result = service.identify(&request).await?;
/// tracing::info!(elapsed_ms = timer.elapsed_ms(), "Identified");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time in whole milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left before `deadline`, `None` once it has passed
    pub fn remaining(&self, deadline: Duration) -> Option<Duration> {
        deadline.checked_sub(self.start.elapsed())
    }
}

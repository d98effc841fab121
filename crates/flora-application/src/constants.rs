//! Application layer constants

use std::time::Duration;

// ============================================================================
// WORKER POOL
// ============================================================================

/// Upper bound on worker pool slots, whatever the configuration says
pub const WORKER_POOL_MAX_SIZE: usize = 32;

/// Slots per available core when no size is configured
pub const WORKER_POOL_SLOTS_PER_CORE: usize = 4;

/// How long `shutdown(drain = true)` waits before cancelling
pub const WORKER_POOL_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// CIRCUIT BREAKER DEFAULTS
// ============================================================================

pub const PRIMARY_FAILURE_THRESHOLD: u32 = 3;
pub const PRIMARY_RESET_TIMEOUT: Duration = Duration::from_secs(60);
pub const SECONDARY_FAILURE_THRESHOLD: u32 = 5;
pub const SECONDARY_RESET_TIMEOUT: Duration = Duration::from_secs(30);
pub const CIRCUIT_SUCCESS_THRESHOLD: u32 = 2;

// ============================================================================
// RESULT CACHE / STAMPEDE LOCK
// ============================================================================

/// TTL of a complete merged result
pub const RESULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// TTL of a partial result, kept short so a recovered primary is used soon
pub const PARTIAL_RESULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Suffix appended to a content key to form its stampede lock key
pub const LOCK_KEY_SUFFIX: &str = ":lock";

pub const LOCK_TTL: Duration = Duration::from_secs(30);
pub const LOCK_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const LOCK_POLL_TIMEOUT: Duration = Duration::from_secs(20);

/// Concurrent direct fills allowed per process
pub const DIRECT_FILL_PERMITS: usize = 2;

/// Upper bound of the random delay before a direct fill
pub const DIRECT_FILL_JITTER: Duration = Duration::from_millis(250);

//! Infrastructure layer constants
//!
//! Orchestration tunables (pool, breaker, lock timings) live in
//! `flora_application::constants`; these are the values owned by
//! configuration, logging and HTTP wiring.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "flora.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "flora";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "FLORA";

/// Separator between nested keys in environment variables
///
/// `FLORA__CACHE__TTL_SECS` sets `cache.ttl_secs`.
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Environment variable overriding the configured log filter
pub const LOG_ENV_VAR: &str = "FLORA_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// File name prefix of rolled log files
pub const LOG_FILE_PREFIX: &str = "flora";

// ============================================================================
// PROVIDER CONSTANTS
// ============================================================================

/// Default primary (Plant.id) call timeout in milliseconds
pub const PRIMARY_TIMEOUT_MS: u64 = 8_000;

/// Default secondary (Pl@ntNet) call timeout in milliseconds
pub const SECONDARY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// HTTP CLIENT CONSTANTS
// ============================================================================

/// TCP connect timeout for provider calls in seconds
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Idle connections kept per provider host
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 8;

/// User agent sent to identification APIs
pub const HTTP_USER_AGENT: &str = concat!("flora/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// CACHE CONSTANTS
// ============================================================================

/// Default result cache capacity (entries) for the in-process store
pub const CACHE_DEFAULT_CAPACITY: u64 = 10_000;

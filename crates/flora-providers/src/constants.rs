//! Provider Constants
//!
//! Constants specific to provider implementations. Domain constants live in
//! `flora-domain`, infrastructure defaults in `flora-infrastructure`.

// ============================================================================
// CACHE PROVIDER CONSTANTS
// ============================================================================

/// Default maximum number of entries in the in-memory cache
pub const CACHE_DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Largest value the in-memory cache accepts (1 MiB)
pub const CACHE_MAX_VALUE_BYTES: usize = 1024 * 1024;

// ============================================================================
// LOCK PROVIDER CONSTANTS
// ============================================================================

/// Compare-and-delete: only the holder's token may release a lock
pub const REDIS_LOCK_RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

// ============================================================================
// EVENT BUS CONSTANTS
// ============================================================================

/// Default broadcast channel capacity
pub const EVENT_BUS_DEFAULT_CAPACITY: usize = 1024;

// ============================================================================
// IDENTIFICATION API CONSTANTS
// ============================================================================

/// Plant.id v3 API root
pub const PLANT_ID_DEFAULT_BASE_URL: &str = "https://plant.id/api/v3";

/// Detail fields requested from Plant.id
pub const PLANT_ID_DETAILS: &str =
    "common_names,taxonomy,description,watering,best_light_condition,best_soil_type,toxicity";

/// Pl@ntNet v2 API root
pub const PLANT_NET_DEFAULT_BASE_URL: &str = "https://my-api.plantnet.org/v2";

/// Pl@ntNet project queried when none is configured
pub const PLANT_NET_DEFAULT_PROJECT: &str = "all";

/// JSON content type header value
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Header carrying the Plant.id API key
pub const PLANT_ID_API_KEY_HEADER: &str = "Api-Key";

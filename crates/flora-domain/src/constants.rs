//! Domain layer constants
//!
//! Contains constants that are part of the identification domain and are used
//! by the application layer. Infrastructure-specific constants remain in
//! `flora_infrastructure::constants`.

// ============================================================================
// CONTENT KEY CONSTANTS
// ============================================================================

/// Prefix of every content key
pub const CONTENT_KEY_PREFIX: &str = "flora";

/// Version of the normalization and merge logic.
///
/// Bumping it changes every content key, so entries written by older merge
/// logic are never read again.
pub const CONTENT_KEY_VERSION: u32 = 1;

/// Domain separation tag mixed into the content digest
pub const CONTENT_KEY_DOMAIN_TAG: &[u8] = b"flora/identification";

// ============================================================================
// REQUEST CONSTANTS
// ============================================================================

/// Maximum accepted image size in bytes (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

// ============================================================================
// PROVIDER NAMES
// ============================================================================

/// Name reported by the Plant.id adapter
pub const PROVIDER_PLANT_ID: &str = "plant_id";

/// Name reported by the Pl@ntNet adapter
pub const PROVIDER_PLANT_NET: &str = "plant_net";

/// Name reported by the disabled-slot adapter
pub const PROVIDER_NULL: &str = "null";

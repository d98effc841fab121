//! Content-addressed cache keys

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::options::IdentificationOptions;
use crate::constants::{CONTENT_KEY_DOMAIN_TAG, CONTENT_KEY_PREFIX, CONTENT_KEY_VERSION};

/// Value Object: Content Key
///
/// Deterministic digest of an image and its identification options.
/// Identical images submitted with identical options map to the same key
/// no matter which request path computed it.
///
/// Format: `flora:v{version}:{sha256 hex}`.
///
/// ## Digest input
///
/// - domain tag
/// - key version (u32 LE)
/// - image length (u64 LE) followed by the image bytes
/// - every option name, length-prefixed, in sorted order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    /// Derive the key for an image and option set
    pub fn derive(image: &[u8], options: &IdentificationOptions) -> Self {
        Self::derive_versioned(image, options, CONTENT_KEY_VERSION)
    }

    /// Derive the key with an explicit logic version
    pub fn derive_versioned(image: &[u8], options: &IdentificationOptions, version: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(CONTENT_KEY_DOMAIN_TAG);
        hasher.update(version.to_le_bytes());
        hasher.update((image.len() as u64).to_le_bytes());
        hasher.update(image);
        for option in options.iter() {
            let name = option.as_str().as_bytes();
            hasher.update((name.len() as u64).to_le_bytes());
            hasher.update(name);
        }
        let digest = hex::encode(hasher.finalize());
        Self(format!("{CONTENT_KEY_PREFIX}:v{version}:{digest}"))
    }

    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log lines (prefix + first 12 hex chars)
    pub fn short(&self) -> &str {
        let cut = self
            .0
            .rfind(':')
            .map_or(self.0.len(), |idx| (idx + 13).min(self.0.len()));
        &self.0[..cut]
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

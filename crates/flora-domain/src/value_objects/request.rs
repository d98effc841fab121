//! Identification request value object

use std::sync::Arc;

use super::content_key::ContentKey;
use super::options::IdentificationOptions;
use crate::constants::MAX_IMAGE_BYTES;
use crate::error::{Error, Result};

/// Value Object: Identification Request
///
/// Immutable request holding the uploaded image, the requested options and
/// the content key derived from both. The image is shared behind an `Arc`
/// so that both provider branches can read it without copying.
///
/// ## Business Rules
///
/// - The image must not be empty
/// - The image must not exceed [`MAX_IMAGE_BYTES`]
/// - The content key is computed once, at construction
#[derive(Debug, Clone)]
pub struct IdentificationRequest {
    image: Arc<[u8]>,
    options: IdentificationOptions,
    content_key: ContentKey,
}

impl IdentificationRequest {
    /// Build a request, validating the image and deriving the content key
    pub fn new(image: impl Into<Vec<u8>>, options: IdentificationOptions) -> Result<Self> {
        let image: Vec<u8> = image.into();
        if image.is_empty() {
            return Err(Error::invalid_argument("Image payload is empty"));
        }
        if image.len() > MAX_IMAGE_BYTES {
            return Err(Error::invalid_argument(format!(
                "Image payload of {} bytes exceeds the {} byte limit",
                image.len(),
                MAX_IMAGE_BYTES
            )));
        }
        let content_key = ContentKey::derive(&image, &options);
        Ok(Self {
            image: Arc::from(image),
            options,
            content_key,
        })
    }

    /// Raw image bytes
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Shared handle to the image bytes
    pub fn shared_image(&self) -> Arc<[u8]> {
        Arc::clone(&self.image)
    }

    pub fn options(&self) -> &IdentificationOptions {
        &self.options
    }

    pub fn content_key(&self) -> &ContentKey {
        &self.content_key
    }
}

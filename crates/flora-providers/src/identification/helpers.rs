//! Common helpers for identification adapters

/// Constructor patterns shared by the HTTP adapters
pub mod constructor {
    /// Trim an API key
    pub fn validate_api_key(api_key: &str) -> String {
        api_key.trim().to_string()
    }

    /// Effective base URL without a trailing slash
    pub fn get_effective_url(provided_url: Option<&str>, default_url: &str) -> String {
        provided_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(default_url)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Guess the image MIME type from its magic bytes
pub fn sniff_mime(image: &[u8]) -> &'static str {
    match image {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'G', b'I', b'F', ..] => "image/gif",
        _ => "image/jpeg",
    }
}

/// File extension matching [`sniff_mime`]
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

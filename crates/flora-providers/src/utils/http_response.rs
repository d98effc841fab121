//! HTTP Response Utilities
//!
//! Maps HTTP outcomes of identification APIs onto typed provider failures.
//! Shared by every HTTP adapter so both providers classify errors the same
//! way for their circuit breakers.

use std::time::Duration;

use flora_domain::value_objects::{ProviderFailure, ProviderFailureKind};
use reqwest::{Response, StatusCode};

/// Longest error body quoted in a failure message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Utilities for processing HTTP responses
pub struct HttpResponseUtils;

impl HttpResponseUtils {
    /// Classify a non-success status code
    pub fn classify_status(status: StatusCode) -> ProviderFailureKind {
        match status.as_u16() {
            429 => ProviderFailureKind::RateLimited,
            400 | 404 | 413 | 415 | 422 => ProviderFailureKind::InvalidInput,
            _ => ProviderFailureKind::ServerError,
        }
    }

    /// Classify a transport-level error
    pub fn classify_transport(
        error: &reqwest::Error,
        provider_name: &str,
        timeout: Duration,
    ) -> ProviderFailure {
        if error.is_timeout() {
            ProviderFailure::timeout(format!(
                "{provider_name} request timed out after {timeout:?}"
            ))
        } else {
            ProviderFailure::server_error(format!("{provider_name} request failed: {error}"))
        }
    }

    /// Check response status and parse JSON
    pub async fn check_and_parse(
        response: Response,
        provider_name: &str,
    ) -> Result<serde_json::Value, ProviderFailure> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            let kind = Self::classify_status(status);
            let context = match kind {
                ProviderFailureKind::RateLimited => "rate limit exceeded",
                ProviderFailureKind::InvalidInput => "rejected the image",
                _ if matches!(status.as_u16(), 401 | 403) => "authentication failed",
                _ => "server error",
            };
            return Err(ProviderFailure::new(
                kind,
                format!("{provider_name} {context} ({}): {body}", status.as_u16()),
            ));
        }

        response.json().await.map_err(|e| {
            ProviderFailure::server_error(format!("{provider_name} response parse failed: {e}"))
        })
    }
}

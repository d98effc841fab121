//! Shared utilities for provider implementations

pub mod http_response;
pub mod json;

pub use http_response::HttpResponseUtils;
pub use json::JsonValueExt;

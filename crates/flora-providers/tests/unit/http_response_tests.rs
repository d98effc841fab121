//! Unit tests for HTTP status classification

use flora_domain::value_objects::ProviderFailureKind;
use flora_providers::utils::{HttpResponseUtils, JsonValueExt};
use reqwest::StatusCode;
use serde_json::json;

#[test]
fn test_rate_limit_status() {
    assert_eq!(
        HttpResponseUtils::classify_status(StatusCode::TOO_MANY_REQUESTS),
        ProviderFailureKind::RateLimited
    );
}

#[test]
fn test_invalid_input_statuses() {
    for code in [400u16, 404, 413, 415, 422] {
        let status = StatusCode::from_u16(code).expect("valid status code");
        assert_eq!(
            HttpResponseUtils::classify_status(status),
            ProviderFailureKind::InvalidInput,
            "status {code} should be invalid_input"
        );
    }
}

#[test]
fn test_server_error_statuses() {
    for code in [401u16, 403, 500, 502, 503, 504] {
        let status = StatusCode::from_u16(code).expect("valid status code");
        assert_eq!(
            HttpResponseUtils::classify_status(status),
            ProviderFailureKind::ServerError,
            "status {code} should be server_error"
        );
    }
}

#[test]
fn test_display_text_variants() {
    assert_eq!(json!("  moist ").display_text().as_deref(), Some("moist"));
    assert_eq!(json!({"min": 1, "max": 2}).display_text().as_deref(), Some("1-2"));
    assert_eq!(json!({"min": 2, "max": 2}).display_text().as_deref(), Some("2"));
    assert_eq!(json!({"value": "Shade tolerant"}).display_text().as_deref(), Some("Shade tolerant"));
    assert_eq!(json!(["loam", "sand"]).display_text().as_deref(), Some("loam, sand"));
    assert_eq!(json!(null).display_text(), None);
    assert_eq!(json!("").display_text(), None);
}

#[test]
fn test_string_list_skips_non_strings() {
    let names = json!(["Rose", 3, "", "Dog rose"]).string_list();
    assert_eq!(names, vec!["Rose".to_string(), "Dog rose".to_string()]);
}

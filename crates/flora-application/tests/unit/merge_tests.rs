//! Unit tests for the primary/secondary merge policy

use std::time::Duration;

use flora_application::merge::{BranchOutcome, merge};
use flora_domain::error::Error;
use flora_domain::value_objects::{
    CareAttributes, Completeness, ConfidenceLevel, ContentKey, IdentificationOptions,
    IdentificationPayload, PlantSuggestion, ProviderFailure, ProviderFailureKind, ProviderRole,
};

use crate::test_utils::{primary_payload, secondary_payload};

fn key() -> ContentKey {
    ContentKey::derive(b"leaf", &IdentificationOptions::new())
}

fn primary(result: Result<IdentificationPayload, ProviderFailure>) -> BranchOutcome {
    BranchOutcome::new("plant_id", ProviderRole::Primary, result, Duration::from_millis(120))
}

fn secondary(result: Result<IdentificationPayload, ProviderFailure>) -> BranchOutcome {
    BranchOutcome::new("plant_net", ProviderRole::Secondary, result, Duration::from_millis(80))
}

#[test]
fn test_primary_is_authoritative() {
    let merged = merge(&key(), primary(Ok(primary_payload())), secondary(Ok(secondary_payload())))
        .expect("merge succeeds");

    assert_eq!(merged.completeness, Completeness::Complete);
    assert_eq!(merged.confidence, ConfidenceLevel::Standard);
    assert_eq!(merged.suggestions.len(), 2);

    let top = merged.top_suggestion().expect("top suggestion");
    assert_eq!(top.scientific_name, "Monstera deliciosa");
    assert!((top.confidence - 0.93).abs() < 1e-9);
    assert_eq!(merged.care.watering.as_deref(), Some("Moderate"));
}

#[test]
fn test_secondary_supplements_matching_species() {
    let merged = merge(&key(), primary(Ok(primary_payload())), secondary(Ok(secondary_payload())))
        .expect("merge succeeds");

    let top = merged.top_suggestion().expect("top suggestion");
    // order only came from the secondary; family stays the primary's
    assert_eq!(top.taxonomy.order.as_deref(), Some("Alismatales"));
    assert_eq!(top.taxonomy.family.as_deref(), Some("Araceae"));
    // "swiss cheese plant" is already known under different casing
    assert_eq!(
        top.common_names,
        vec!["Swiss cheese plant".to_string(), "Ceriman".to_string()]
    );
}

#[test]
fn test_different_species_is_not_supplemented() {
    let mut other = secondary_payload();
    other.suggestions = vec![PlantSuggestion::new("Philodendron hederaceum", 0.6)];
    other.care = CareAttributes {
        soil: Some("Peat-based".to_string()),
        ..CareAttributes::default()
    };

    let merged =
        merge(&key(), primary(Ok(primary_payload())), secondary(Ok(other))).expect("merge");

    let top = merged.top_suggestion().expect("top suggestion");
    assert!(top.taxonomy.order.is_none());
    assert_eq!(top.common_names.len(), 1);
    // care gaps are filled regardless of species agreement
    assert_eq!(merged.care.soil.as_deref(), Some("Peat-based"));
}

#[test]
fn test_secondary_never_overrides_primary_care() {
    let mut other = secondary_payload();
    other.care.watering = Some("Daily".to_string());

    let merged =
        merge(&key(), primary(Ok(primary_payload())), secondary(Ok(other))).expect("merge");
    assert_eq!(merged.care.watering.as_deref(), Some("Moderate"));
}

#[test]
fn test_primary_failure_gives_partial_result() {
    let merged = merge(
        &key(),
        primary(Err(ProviderFailure::timeout("no response within 8000ms"))),
        secondary(Ok(secondary_payload())),
    )
    .expect("secondary alone is enough");

    assert_eq!(merged.completeness, Completeness::Partial);
    assert_eq!(merged.confidence, ConfidenceLevel::Reduced);
    assert!(merged.is_partial());
    assert_eq!(
        merged.top_suggestion().map(|s| s.scientific_name.as_str()),
        Some("monstera deliciosa")
    );

    let primary_source = &merged.sources[0];
    assert_eq!(primary_source.role, ProviderRole::Primary);
    assert_eq!(
        primary_source.failure.as_ref().map(|f| f.kind),
        Some(ProviderFailureKind::Timeout)
    );
    assert!(merged.sources[1].succeeded());
    assert_eq!(merged.sources[1].elapsed_ms, 80);
}

#[test]
fn test_secondary_failure_keeps_complete_result() {
    let merged = merge(
        &key(),
        primary(Ok(primary_payload())),
        secondary(Err(ProviderFailure::rate_limited("quota"))),
    )
    .expect("primary alone is enough");

    assert_eq!(merged.completeness, Completeness::Complete);
    assert!(!merged.sources[1].succeeded());
}

#[test]
fn test_both_failing_is_total_failure() {
    let err = merge(
        &key(),
        primary(Err(ProviderFailure::server_error("502"))),
        secondary(Err(ProviderFailure::circuit_open("open"))),
    )
    .expect_err("nothing to return");

    assert!(err.is_service_unavailable());
    let Error::TotalFailure { failures } = err else {
        panic!("expected total failure");
    };
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].provider, "plant_id");
    assert_eq!(failures[0].failure.kind, ProviderFailureKind::ServerError);
    assert_eq!(failures[1].role, ProviderRole::Secondary);
    assert_eq!(failures[1].failure.kind, ProviderFailureKind::CircuitOpen);
}

#[test]
fn test_no_plant_detected_is_a_result() {
    let nothing = IdentificationPayload {
        plant_detected: false,
        ..IdentificationPayload::default()
    };
    let merged = merge(
        &key(),
        primary(Ok(nothing)),
        secondary(Err(ProviderFailure::invalid_input("not a plant photo"))),
    )
    .expect("no plant is still a success");

    assert!(!merged.plant_detected);
    assert!(merged.suggestions.is_empty());
    assert_eq!(merged.completeness, Completeness::Complete);
}

//! Tests for string search parameters.
//!
//! String matching is case-insensitive prefix by default, with `:exact`
//! and `:contains` modifiers.

use serde_json::json;

use helios_index::types::SearchParamType;

use crate::common::{engine_with, ids, param, patients, seeded_engine};

// ============================================================================
// Default Prefix Matching
// ============================================================================

/// Test that a prefix matches regardless of case.
#[test]
fn test_string_prefix_case_insensitive() {
    let engine = seeded_engine();

    assert_eq!(ids(&engine, "Patient", &[("family", "sm")]), vec!["p1", "p2"]);
    assert_eq!(ids(&engine, "Patient", &[("family", "SM")]), vec!["p1", "p2"]);
    assert_eq!(ids(&engine, "Patient", &[("family", "smithy")]), Vec::<String>::new());
}

/// Test that the whole value is also a prefix of itself.
#[test]
fn test_string_full_value_matches() {
    let engine = seeded_engine();
    assert_eq!(ids(&engine, "Patient", &[("family", "Jones")]), vec!["p3"]);
}

/// Test that HumanName parts are all indexed under `name`.
#[test]
fn test_string_human_name_parts() {
    let engine = seeded_engine();

    assert_eq!(ids(&engine, "Patient", &[("name", "john")]), vec!["p1"]);
    assert_eq!(ids(&engine, "Patient", &[("name", "smith")]), vec!["p1", "p2"]);
    assert_eq!(ids(&engine, "Patient", &[("given", "ja")]), vec!["p2"]);
}

// ============================================================================
// Modifiers
// ============================================================================

/// Test `:exact` against the lowercased value.
#[test]
fn test_string_exact_modifier() {
    let engine = seeded_engine();

    assert_eq!(ids(&engine, "Patient", &[("family:exact", "smith")]), vec!["p1"]);
    assert_eq!(ids(&engine, "Patient", &[("family:exact", "Smith")]), vec!["p1"]);
    assert!(ids(&engine, "Patient", &[("family:exact", "smi")]).is_empty());
}

/// Test `:contains` as a substring match.
#[test]
fn test_string_contains_modifier() {
    let engine = seeded_engine();

    assert_eq!(ids(&engine, "Patient", &[("family:contains", "ITH")]), vec!["p1", "p2"]);
    assert_eq!(ids(&engine, "Patient", &[("family:contains", "ther")]), vec!["p2"]);
}

/// Test that an unsupported modifier makes the parameter a no-op.
#[test]
fn test_string_unsupported_modifier_ignored() {
    let engine = seeded_engine();
    assert_eq!(
        ids(&engine, "Patient", &[("family:text", "nomatch")]),
        vec!["p1", "p2", "p3"]
    );
}

// ============================================================================
// Custom Parameters
// ============================================================================

/// Test a string parameter over plain scalar values.
#[test]
fn test_string_custom_scalar_param() {
    let engine = helios_index::SearchEngine::new();
    let mut records = patients();
    records.push(json!({"resourceType": "Patient", "id": "p4", "nickname": "Smitty"}));
    engine
        .rebuild(
            records,
            vec![param("Patient", "nickname", SearchParamType::String, "Patient.nickname")],
        )
        .unwrap();

    assert_eq!(ids(&engine, "Patient", &[("nickname", "smi")]), vec!["p4"]);
    // The core `family` parameter was not supplied, so it is unknown here.
    assert_eq!(ids(&engine, "Patient", &[("family", "zzz")]).len(), 4);
}

/// Test that an empty string value produces no index entry.
#[test]
fn test_string_empty_value_not_indexed() {
    let engine = engine_with(vec![
        json!({"resourceType": "Patient", "id": "a", "name": [{"family": ""}]}),
    ]);
    let stats = engine.stats();
    assert_eq!(stats.per_type["Patient"].count, 1);
    assert!(ids(&engine, "Patient", &[("family", "a")]).is_empty());
}

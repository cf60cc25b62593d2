//! Tests for query composition and leniency.
//!
//! Comma-separated values are ORed, separate parameters are ANDed, and
//! parameters the engine does not understand are ignored.

use helios_index::SearchEngine;

use crate::common::{ids, seeded_engine};

// ============================================================================
// AND / OR
// ============================================================================

/// Test OR within a parameter value.
#[test]
fn test_or_within_parameter() {
    let engine = seeded_engine();
    assert_eq!(
        ids(&engine, "Patient", &[("gender", "male,female")]),
        vec!["p1", "p2", "p3"]
    );
    assert_eq!(ids(&engine, "Patient", &[("family", "jon,smithe")]), vec!["p2", "p3"]);
}

/// Test AND across parameters.
#[test]
fn test_and_across_parameters() {
    let engine = seeded_engine();

    assert_eq!(
        ids(&engine, "Patient", &[("gender", "male"), ("family", "sm")]),
        vec!["p1"]
    );
    assert!(ids(&engine, "Patient", &[("gender", "female"), ("birthdate", "1970")]).is_empty());
}

/// Test that a repeated parameter name is ANDed.
#[test]
fn test_repeated_parameter_is_and() {
    let engine = seeded_engine();
    assert_eq!(
        ids(&engine, "Patient", &[("birthdate", "1970"), ("birthdate", "1970-07")]),
        vec!["p3"]
    );
}

// ============================================================================
// Listing and Leniency
// ============================================================================

/// Test that no parameters lists every record of the type.
#[test]
fn test_no_parameters_lists_all() {
    let engine = seeded_engine();
    assert_eq!(ids(&engine, "Patient", &[]), vec!["p1", "p2", "p3"]);
    assert_eq!(ids(&engine, "Observation", &[]), vec!["o1", "o2", "o3"]);
}

/// Test that unknown and reserved parameters are ignored.
#[test]
fn test_unknown_and_reserved_ignored() {
    let engine = seeded_engine();

    assert_eq!(
        ids(&engine, "Patient", &[("favourite-color", "blue"), ("gender", "female")]),
        vec!["p2"]
    );
    assert_eq!(
        ids(&engine, "Patient", &[("_count", "1"), ("_sort", "family"), ("_id", "p1")]),
        vec!["p1", "p2", "p3"]
    );
}

/// Test that a value of only separators does not restrict the result.
#[test]
fn test_empty_terms_ignored() {
    let engine = seeded_engine();
    assert_eq!(ids(&engine, "Patient", &[("gender", ",,")]), vec!["p1", "p2", "p3"]);
    assert_eq!(ids(&engine, "Patient", &[("gender", "")]), vec!["p1", "p2", "p3"]);
}

/// Test that an unknown resource type yields nothing.
#[test]
fn test_unknown_type_empty() {
    let engine = seeded_engine();
    assert!(ids(&engine, "Practitioner", &[]).is_empty());
    assert!(ids(&engine, "Practitioner", &[("name", "smith")]).is_empty());
}

/// Test that results are in id order regardless of insertion order.
#[test]
fn test_results_ordered_by_id() {
    let mut records = crate::common::patients();
    records.reverse();
    let engine = SearchEngine::new();
    engine.rebuild(records, crate::common::core_params()).unwrap();

    assert_eq!(ids(&engine, "Patient", &[("gender", "male")]), vec!["p1", "p3"]);
}

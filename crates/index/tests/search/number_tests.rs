//! Tests for number and quantity search parameters.

use serde_json::json;

use helios_index::SearchEngine;
use helios_index::types::SearchParamType;

use crate::common::{ids, param, seeded_engine};

fn engine_with_scores() -> SearchEngine {
    let engine = SearchEngine::new();
    engine
        .rebuild(
            vec![
                json!({"resourceType": "RiskAssessment", "id": "r1", "score": 5}),
                json!({"resourceType": "RiskAssessment", "id": "r2", "score": 5.0}),
                json!({"resourceType": "RiskAssessment", "id": "r3", "score": 5.1}),
                json!({"resourceType": "RiskAssessment", "id": "r4", "score": "7"}),
                json!({"resourceType": "RiskAssessment", "id": "r5", "score": "high"}),
            ],
            vec![param(
                "RiskAssessment",
                "score",
                SearchParamType::Number,
                "RiskAssessment.score",
            )],
        )
        .unwrap();
    engine
}

// ============================================================================
// Number Equality
// ============================================================================

/// Test that 5 and 5.0 compare equal and 5.1 does not.
#[test]
fn test_number_equality() {
    let engine = engine_with_scores();

    assert_eq!(ids(&engine, "RiskAssessment", &[("score", "5")]), vec!["r1", "r2"]);
    assert_eq!(ids(&engine, "RiskAssessment", &[("score", "5.0")]), vec!["r1", "r2"]);
    assert_eq!(ids(&engine, "RiskAssessment", &[("score", "5.1")]), vec!["r3"]);
}

/// Test that numeric strings in the data are indexed as numbers.
#[test]
fn test_number_from_string_value() {
    let engine = engine_with_scores();
    assert_eq!(ids(&engine, "RiskAssessment", &[("score", "7.00")]), vec!["r4"]);
}

/// Test that a non-numeric data value is dropped without failing the build.
#[test]
fn test_number_non_numeric_value_dropped() {
    let engine = engine_with_scores();
    let stats = engine.stats();

    assert_eq!(stats.per_type["RiskAssessment"].count, 5);
    assert_eq!(stats.per_type["RiskAssessment"].index_entry_count, 4);
    assert_eq!(stats.extraction_failures, 0);
}

/// Test that an unparseable query number matches nothing.
#[test]
fn test_number_unparseable_query_term() {
    let engine = engine_with_scores();

    assert!(ids(&engine, "RiskAssessment", &[("score", "abc")]).is_empty());
    // Only the parseable term contributes.
    assert_eq!(ids(&engine, "RiskAssessment", &[("score", "abc,7")]), vec!["r4"]);
}

// ============================================================================
// Quantity
// ============================================================================

/// Test quantity values taken from `valueQuantity.value`.
#[test]
fn test_quantity_value() {
    let engine = seeded_engine();

    assert_eq!(ids(&engine, "Observation", &[("value-quantity", "72")]), vec!["o1", "o2"]);
    assert_eq!(ids(&engine, "Observation", &[("value-quantity", "80.5")]), vec!["o3"]);
    assert!(ids(&engine, "Observation", &[("value-quantity", "80")]).is_empty());
}

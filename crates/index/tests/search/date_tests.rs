//! Tests for date search parameters.
//!
//! Date matching is by literal prefix of the stored value.

use serde_json::json;

use crate::common::{engine_with, ids, seeded_engine};

/// Test year and month prefixes.
#[test]
fn test_date_prefix() {
    let engine = seeded_engine();

    assert_eq!(ids(&engine, "Patient", &[("birthdate", "1970")]), vec!["p1", "p3"]);
    assert_eq!(ids(&engine, "Patient", &[("birthdate", "1970-03")]), vec!["p1"]);
    assert_eq!(ids(&engine, "Patient", &[("birthdate", "1985-11-02")]), vec!["p2"]);
    assert!(ids(&engine, "Patient", &[("birthdate", "1971")]).is_empty());
}

/// Test that a choice-typed date (`effectiveDateTime`) is indexed.
#[test]
fn test_date_choice_element() {
    let engine = seeded_engine();

    assert_eq!(ids(&engine, "Observation", &[("date", "2024")]), vec!["o1", "o2"]);
    assert_eq!(ids(&engine, "Observation", &[("date", "2024-01-15T10")]), vec!["o1"]);
}

/// Test that both ends of a Period are indexed.
#[test]
fn test_date_period() {
    let engine = engine_with(vec![json!({
        "resourceType": "Encounter",
        "id": "e1",
        "status": "finished",
        "period": {"start": "2023-05-01", "end": "2023-06-10"}
    })]);

    assert_eq!(ids(&engine, "Encounter", &[("date", "2023-05")]), vec!["e1"]);
    assert_eq!(ids(&engine, "Encounter", &[("date", "2023-06")]), vec!["e1"]);
    assert!(ids(&engine, "Encounter", &[("date", "2023-07")]).is_empty());
}

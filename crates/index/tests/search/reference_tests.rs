//! Tests for reference search parameters.

use crate::common::{ids, seeded_engine};

/// Test exact match on the reference string.
#[test]
fn test_reference_exact() {
    let engine = seeded_engine();

    assert_eq!(
        ids(&engine, "Observation", &[("subject", "Patient/p1")]),
        vec!["o1", "o3"]
    );
    assert_eq!(
        ids(&engine, "Patient", &[("organization", "Organization/org2")]),
        vec!["p2"]
    );
}

/// Test that references are not prefix matched or case-folded.
#[test]
fn test_reference_no_prefix_or_case_folding() {
    let engine = seeded_engine();

    assert!(ids(&engine, "Observation", &[("subject", "Patient/p")]).is_empty());
    assert!(ids(&engine, "Observation", &[("subject", "patient/p1")]).is_empty());
}

/// Test a reference parameter whose expression filters with `where(...)`.
#[test]
fn test_reference_patient_param() {
    let engine = seeded_engine();
    assert_eq!(
        ids(&engine, "Observation", &[("patient", "Patient/p2")]),
        vec!["o2"]
    );
}

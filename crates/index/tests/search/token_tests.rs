//! Tests for token search parameters.
//!
//! This module tests token-type search parameters including
//! system|code, code-only and |code formats.

use crate::common::{ids, seeded_engine};

// ============================================================================
// Token Search Tests - System|Code Format
// ============================================================================

/// Test token search with system|code format.
#[test]
fn test_token_search_system_and_code() {
    let engine = seeded_engine();

    assert_eq!(
        ids(&engine, "Observation", &[("code", "http://loinc.org|8867-4")]),
        vec!["o1"]
    );
    assert_eq!(
        ids(&engine, "Patient", &[("identifier", "http://example.org/mrn|MRN001")]),
        vec!["p1"]
    );
}

/// Test that system|code does not match the same code under another system.
#[test]
fn test_token_search_wrong_system() {
    let engine = seeded_engine();
    assert!(ids(&engine, "Observation", &[("code", "http://other.org|8867-4")]).is_empty());
}

// ============================================================================
// Token Search Tests - Code Only
// ============================================================================

/// Test that a code without a system matches the code under any system.
#[test]
fn test_token_search_code_any_system() {
    let engine = seeded_engine();
    assert_eq!(ids(&engine, "Observation", &[("code", "8867-4")]), vec!["o1", "o2"]);
}

/// Test code-only search against a plain code value.
#[test]
fn test_token_search_plain_code() {
    let engine = seeded_engine();

    assert_eq!(ids(&engine, "Patient", &[("gender", "male")]), vec!["p1", "p3"]);
    assert_eq!(ids(&engine, "Patient", &[("gender", "MALE")]), vec!["p1", "p3"]);
    assert_eq!(ids(&engine, "Observation", &[("status", "final")]), vec!["o1", "o3"]);
}

/// Test token search with a boolean value.
#[test]
fn test_token_search_boolean() {
    let engine = seeded_engine();
    assert_eq!(ids(&engine, "Patient", &[("active", "true")]), vec!["p1"]);
    assert_eq!(ids(&engine, "Patient", &[("active", "false")]), vec!["p2"]);
}

// ============================================================================
// Token Search Tests - Identifiers Without System
// ============================================================================

/// Test that an identifier without a system is found by its value.
#[test]
fn test_token_search_identifier_without_system() {
    let engine = seeded_engine();

    assert_eq!(ids(&engine, "Patient", &[("identifier", "LOCAL123")]), vec!["p3"]);
    assert_eq!(ids(&engine, "Patient", &[("identifier", "|local123")]), vec!["p3"]);
    assert!(ids(&engine, "Patient", &[("identifier", "|MRN001")]).is_empty());
}

/// Test multiple identifiers on one resource.
#[test]
fn test_token_search_multiple_identifiers() {
    let engine = seeded_engine();
    assert_eq!(
        ids(&engine, "Patient", &[("identifier", "http://hl7.org/fhir/sid/us-ssn|123-45-6789")]),
        vec!["p1"]
    );
}

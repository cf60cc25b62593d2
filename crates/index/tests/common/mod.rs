//! Shared fixtures for the index integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};

use helios_index::SearchEngine;
use helios_index::search::{SearchParameterDefinition, SearchParameterLoader};
use helios_index::types::SearchParamType;

// ============================================================================
// Definitions
// ============================================================================

/// Definition with a generated url for a single base type.
pub fn param(
    base: &str,
    code: &str,
    param_type: SearchParamType,
    expression: &str,
) -> SearchParameterDefinition {
    SearchParameterDefinition::new(
        format!("http://example.org/SearchParameter/{}-{}", base, code),
        code,
        param_type,
        expression,
    )
    .with_base(vec![base])
}

/// The embedded core parameters.
pub fn core_params() -> Vec<SearchParameterDefinition> {
    SearchParameterLoader::new().load_embedded()
}

// ============================================================================
// Records
// ============================================================================

pub fn patients() -> Vec<Value> {
    vec![
        json!({
            "resourceType": "Patient",
            "id": "p1",
            "gender": "male",
            "birthDate": "1970-03-15",
            "active": true,
            "name": [{"family": "Smith", "given": ["John", "Q"]}],
            "identifier": [
                {"system": "http://example.org/mrn", "value": "MRN001"},
                {"system": "http://hl7.org/fhir/sid/us-ssn", "value": "123-45-6789"}
            ],
            "managingOrganization": {"reference": "Organization/org1"}
        }),
        json!({
            "resourceType": "Patient",
            "id": "p2",
            "gender": "female",
            "birthDate": "1985-11-02",
            "active": false,
            "name": [{"family": "Smithers", "given": ["Jane"]}],
            "identifier": [{"system": "http://example.org/mrn", "value": "MRN002"}],
            "managingOrganization": {"reference": "Organization/org2"}
        }),
        json!({
            "resourceType": "Patient",
            "id": "p3",
            "gender": "male",
            "birthDate": "1970-07-01",
            "name": [{"family": "Jones", "given": ["Bob"]}],
            "identifier": [{"value": "LOCAL123"}]
        }),
    ]
}

pub fn observations() -> Vec<Value> {
    vec![
        json!({
            "resourceType": "Observation",
            "id": "o1",
            "status": "final",
            "code": {"coding": [
                {"system": "http://loinc.org", "code": "8867-4", "display": "Heart rate"}
            ]},
            "subject": {"reference": "Patient/p1"},
            "effectiveDateTime": "2024-01-15T10:30:00Z",
            "valueQuantity": {"value": 72, "unit": "beats/minute"}
        }),
        json!({
            "resourceType": "Observation",
            "id": "o2",
            "status": "preliminary",
            "code": {"coding": [
                {"system": "http://snomed.info/sct", "code": "8867-4"}
            ]},
            "subject": {"reference": "Patient/p2"},
            "effectiveDateTime": "2024-02-01",
            "valueQuantity": {"value": 72.0, "unit": "beats/minute"}
        }),
        json!({
            "resourceType": "Observation",
            "id": "o3",
            "status": "final",
            "code": {"coding": [
                {"system": "http://loinc.org", "code": "29463-7", "display": "Body weight"}
            ]},
            "subject": {"reference": "Patient/p1"},
            "effectiveDateTime": "2023-12-31",
            "valueQuantity": {"value": 80.5, "unit": "kg"}
        }),
    ]
}

/// Patients and observations.
pub fn all_records() -> Vec<Value> {
    let mut records = patients();
    records.extend(observations());
    records
}

// ============================================================================
// Engines
// ============================================================================

/// An engine built over `records` with the core parameters.
pub fn engine_with(records: Vec<Value>) -> SearchEngine {
    let engine = SearchEngine::new();
    engine
        .rebuild(records, core_params())
        .expect("rebuild should succeed");
    engine
}

/// An engine built over [`all_records`].
pub fn seeded_engine() -> SearchEngine {
    engine_with(all_records())
}

/// Sorted ids of a search result.
pub fn ids(engine: &SearchEngine, resource_type: &str, params: &[(&str, &str)]) -> Vec<String> {
    engine
        .search(resource_type, params.iter().copied())
        .iter()
        .map(|r| r.id().to_string())
        .collect()
}

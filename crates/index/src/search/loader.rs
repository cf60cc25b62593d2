//! SearchParameter Loader.
//!
//! Loads SearchParameter definitions from:
//! - Embedded core parameters (compiled into the binary)
//! - SearchParameter resources in JSON (Bundle, array, or single resource)
//! - Runtime configuration files

use std::path::Path;

use serde_json::Value;

use crate::types::SearchParamType;

use super::errors::LoaderError;
use super::registry::{SearchParameterDefinition, SearchParameterSource, SearchParameterStatus};

const CORE_URL_BASE: &str = "http://hl7.org/fhir/SearchParameter/";

/// Core parameters shipped with the engine: (url suffix, code, type, expression, base).
const CORE_PARAMETERS: &[(&str, &str, SearchParamType, &str, &str)] = &[
    ("Resource-id", "_id", SearchParamType::Token, "id", "Resource"),
    ("Resource-lastUpdated", "_lastUpdated", SearchParamType::Date, "meta.lastUpdated", "Resource"),
    ("Resource-tag", "_tag", SearchParamType::Token, "meta.tag", "Resource"),
    ("Resource-profile", "_profile", SearchParamType::Uri, "meta.profile", "Resource"),
    ("Resource-security", "_security", SearchParamType::Token, "meta.security", "Resource"),
    ("Patient-name", "name", SearchParamType::String, "Patient.name", "Patient"),
    ("Patient-family", "family", SearchParamType::String, "Patient.name.family", "Patient"),
    ("Patient-given", "given", SearchParamType::String, "Patient.name.given", "Patient"),
    ("Patient-identifier", "identifier", SearchParamType::Token, "Patient.identifier", "Patient"),
    ("Patient-birthdate", "birthdate", SearchParamType::Date, "Patient.birthDate", "Patient"),
    ("Patient-gender", "gender", SearchParamType::Token, "Patient.gender", "Patient"),
    ("Patient-active", "active", SearchParamType::Token, "Patient.active", "Patient"),
    (
        "Patient-organization",
        "organization",
        SearchParamType::Reference,
        "Patient.managingOrganization",
        "Patient",
    ),
    ("Observation-code", "code", SearchParamType::Token, "Observation.code", "Observation"),
    ("Observation-subject", "subject", SearchParamType::Reference, "Observation.subject", "Observation"),
    (
        "Observation-patient",
        "patient",
        SearchParamType::Reference,
        "Observation.subject.where(resolve() is Patient)",
        "Observation",
    ),
    ("Observation-date", "date", SearchParamType::Date, "Observation.effective", "Observation"),
    (
        "Observation-value-quantity",
        "value-quantity",
        SearchParamType::Quantity,
        "Observation.value.ofType(Quantity)",
        "Observation",
    ),
    ("Observation-status", "status", SearchParamType::Token, "Observation.status", "Observation"),
    (
        "Encounter-patient",
        "patient",
        SearchParamType::Reference,
        "Encounter.subject.where(resolve() is Patient)",
        "Encounter",
    ),
    ("Encounter-status", "status", SearchParamType::Token, "Encounter.status", "Encounter"),
    ("Encounter-date", "date", SearchParamType::Date, "Encounter.period", "Encounter"),
    (
        "Condition-patient",
        "patient",
        SearchParamType::Reference,
        "Condition.subject.where(resolve() is Patient)",
        "Condition",
    ),
    ("Condition-code", "code", SearchParamType::Token, "Condition.code", "Condition"),
    (
        "MedicationRequest-patient",
        "patient",
        SearchParamType::Reference,
        "MedicationRequest.subject.where(resolve() is Patient)",
        "MedicationRequest",
    ),
    (
        "MedicationRequest-status",
        "status",
        SearchParamType::Token,
        "MedicationRequest.status",
        "MedicationRequest",
    ),
];

/// Loader for SearchParameter definitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchParameterLoader;

impl SearchParameterLoader {
    /// Creates a new loader.
    pub fn new() -> Self {
        Self
    }

    /// Loads the embedded core parameters.
    pub fn load_embedded(&self) -> Vec<SearchParameterDefinition> {
        CORE_PARAMETERS
            .iter()
            .map(|(suffix, code, param_type, expression, base)| {
                let mut def = SearchParameterDefinition::new(
                    format!("{}{}", CORE_URL_BASE, suffix),
                    *code,
                    *param_type,
                    *expression,
                )
                .with_base([*base])
                .with_source(SearchParameterSource::Embedded);
                if *param_type == SearchParamType::Reference && *code == "patient" {
                    def = def.with_targets(["Patient"]);
                }
                def
            })
            .collect()
    }

    /// Loads SearchParameter resources from a JSON bundle, array, or single resource.
    ///
    /// Entries that are not SearchParameter resources are skipped.
    pub fn load_from_json(
        &self,
        json: &Value,
    ) -> Result<Vec<SearchParameterDefinition>, LoaderError> {
        let candidates: Vec<&Value> = if let Some(entries) =
            json.get("entry").and_then(|e| e.as_array())
        {
            entries.iter().filter_map(|e| e.get("resource")).collect()
        } else if let Some(array) = json.as_array() {
            array.iter().collect()
        } else {
            vec![json]
        };

        candidates
            .into_iter()
            .filter(|r| r.get("resourceType").and_then(|t| t.as_str()) == Some("SearchParameter"))
            .map(|r| self.parse_resource(r))
            .collect()
    }

    /// Loads parameters from a configuration file.
    pub fn load_config(
        &self,
        config_path: &Path,
    ) -> Result<Vec<SearchParameterDefinition>, LoaderError> {
        let content =
            std::fs::read_to_string(config_path).map_err(|e| LoaderError::ConfigLoadFailed {
                path: config_path.display().to_string(),
                message: e.to_string(),
            })?;

        let json: Value =
            serde_json::from_str(&content).map_err(|e| LoaderError::ConfigLoadFailed {
                path: config_path.display().to_string(),
                message: format!("Invalid JSON: {}", e),
            })?;

        let mut params = self.load_from_json(&json)?;
        for param in &mut params {
            param.source = SearchParameterSource::Config;
        }

        tracing::debug!(
            path = %config_path.display(),
            count = params.len(),
            "Loaded SearchParameters from config"
        );

        Ok(params)
    }

    /// Parses a SearchParameter FHIR resource into a definition.
    pub fn parse_resource(
        &self,
        resource: &Value,
    ) -> Result<SearchParameterDefinition, LoaderError> {
        let url = resource
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LoaderError::MissingField {
                field: "url".to_string(),
                url: None,
            })?
            .to_string();

        let code = resource
            .get("code")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LoaderError::MissingField {
                field: "code".to_string(),
                url: Some(url.clone()),
            })?
            .to_string();

        let type_str = resource
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LoaderError::MissingField {
                field: "type".to_string(),
                url: Some(url.clone()),
            })?;

        let param_type = type_str.parse::<SearchParamType>().unwrap_or_else(|_| {
            tracing::warn!(url = %url, param_type = %type_str, "Unknown SearchParameter type, treating as special");
            SearchParamType::Special
        });

        let expression = resource
            .get("expression")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        if expression.is_empty() && param_type != SearchParamType::Composite && !code.starts_with('_')
        {
            return Err(LoaderError::MissingField {
                field: "expression".to_string(),
                url: Some(url),
            });
        }

        let base = string_array(resource, "base").unwrap_or_default();
        if base.is_empty() {
            return Err(LoaderError::MissingField {
                field: "base".to_string(),
                url: Some(url),
            });
        }

        let status = match resource.get("status").and_then(|v| v.as_str()) {
            None => SearchParameterStatus::Active,
            Some(s) => SearchParameterStatus::from_fhir_status(s).ok_or_else(|| {
                LoaderError::InvalidResource {
                    message: format!("Unknown status: {}", s),
                    url: Some(url.clone()),
                }
            })?,
        };

        Ok(SearchParameterDefinition {
            code,
            name: resource.get("name").and_then(|v| v.as_str()).map(String::from),
            description: resource
                .get("description")
                .and_then(|v| v.as_str())
                .map(String::from),
            param_type,
            expression,
            base,
            target: string_array(resource, "target"),
            status,
            source: SearchParameterSource::Stored,
            url,
        })
    }
}

fn string_array(resource: &Value, field: &str) -> Option<Vec<String>> {
    resource.get(field).and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    })
}

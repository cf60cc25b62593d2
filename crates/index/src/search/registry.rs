//! SearchParameter Registry.
//!
//! The registry maps each resource type to the SearchParameters that apply
//! to it, keyed by parameter code. A registry is built once per snapshot from
//! a batch of definitions and is immutable afterwards.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::SearchParamType;

use super::errors::RegistryError;

/// Base types that make a definition apply to every resource type.
const UNIVERSAL_BASES: [&str; 2] = ["Resource", "DomainResource"];

/// Status of a SearchParameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchParameterStatus {
    /// Active - can be used in searches.
    #[default]
    Active,
    /// Draft - informational, not yet active.
    Draft,
    /// Retired - disabled, not usable.
    Retired,
}

impl SearchParameterStatus {
    /// Parse from FHIR status string.
    pub fn from_fhir_status(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(SearchParameterStatus::Active),
            "draft" => Some(SearchParameterStatus::Draft),
            "retired" => Some(SearchParameterStatus::Retired),
            _ => None,
        }
    }

    /// Convert to FHIR status string.
    pub fn to_fhir_status(&self) -> &'static str {
        match self {
            SearchParameterStatus::Active => "active",
            SearchParameterStatus::Draft => "draft",
            SearchParameterStatus::Retired => "retired",
        }
    }

    /// Returns true if this status allows the parameter to be indexed and searched.
    pub fn is_usable(&self) -> bool {
        *self == SearchParameterStatus::Active
    }
}

/// Source of a SearchParameter definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchParameterSource {
    /// Built-in standard parameters.
    #[default]
    Embedded,
    /// SearchParameter resources supplied with a rebuild batch.
    Stored,
    /// Runtime configuration file.
    Config,
}

/// Complete definition of a SearchParameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParameterDefinition {
    /// Canonical URL (unique identifier).
    pub url: String,

    /// Parameter code (the query name, e.g., "name", "identifier").
    pub code: String,

    /// Human-readable name.
    pub name: Option<String>,

    /// Description of the parameter.
    pub description: Option<String>,

    /// The parameter type.
    pub param_type: SearchParamType,

    /// Path expression for extracting values.
    pub expression: String,

    /// Resource types this parameter applies to.
    pub base: Vec<String>,

    /// Target resource types (for reference parameters).
    pub target: Option<Vec<String>>,

    /// Current status.
    pub status: SearchParameterStatus,

    /// Source of this definition.
    pub source: SearchParameterSource,
}

impl SearchParameterDefinition {
    /// Creates a new SearchParameter definition.
    pub fn new(
        url: impl Into<String>,
        code: impl Into<String>,
        param_type: SearchParamType,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            code: code.into(),
            name: None,
            description: None,
            param_type,
            expression: expression.into(),
            base: Vec::new(),
            target: None,
            status: SearchParameterStatus::Active,
            source: SearchParameterSource::Embedded,
        }
    }

    /// Sets the base resource types.
    pub fn with_base<I, S>(mut self, base: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base = base.into_iter().map(Into::into).collect();
        self
    }

    /// Sets target types for reference parameters.
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target = Some(targets.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the source.
    pub fn with_source(mut self, source: SearchParameterSource) -> Self {
        self.source = source;
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: SearchParameterStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns whether this parameter applies to the given resource type.
    pub fn applies_to(&self, resource_type: &str) -> bool {
        self.base
            .iter()
            .any(|b| b == resource_type || UNIVERSAL_BASES.contains(&b.as_str()))
    }
}

/// Registry of SearchParameter definitions for one snapshot.
///
/// Provides lookup by (resource_type, param_code) and by URL. Definitions
/// based on `Resource` or `DomainResource` are visible from every type unless
/// a type-specific definition with the same code shadows them.
#[derive(Default)]
pub struct SearchParameterRegistry {
    /// Parameters indexed by (resource_type, param_code).
    params_by_type: HashMap<String, HashMap<String, Arc<SearchParameterDefinition>>>,

    /// Parameters indexed by canonical URL.
    params_by_url: HashMap<String, Arc<SearchParameterDefinition>>,
}

impl SearchParameterRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a batch of definitions.
    ///
    /// Every definition is registered under each of its base types. Fails if
    /// any definition has no code or no base type; the batch is then rejected
    /// as a whole. When two definitions share a (type, code) pair, the later
    /// one wins.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = SearchParameterDefinition>,
    {
        let mut registry = Self::new();
        for param in definitions {
            if param.code.trim().is_empty() {
                return Err(RegistryError::InvalidDefinition {
                    url: param.url,
                    message: "empty parameter code".to_string(),
                });
            }
            if param.base.iter().all(|b| b.trim().is_empty()) {
                return Err(RegistryError::InvalidDefinition {
                    url: param.url,
                    message: "no base resource types".to_string(),
                });
            }
            registry.register_internal(param);
        }
        Ok(registry)
    }

    /// Returns the number of registered parameters.
    pub fn len(&self) -> usize {
        self.params_by_url.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.params_by_url.is_empty()
    }

    /// Gets all active parameters for a resource type, sorted by code.
    ///
    /// Includes `Resource`/`DomainResource` parameters whose code is not
    /// shadowed by a type-specific definition.
    pub fn get_active_params(&self, resource_type: &str) -> Vec<Arc<SearchParameterDefinition>> {
        let mut by_code: BTreeMap<&str, &Arc<SearchParameterDefinition>> = BTreeMap::new();

        let lookup_order: [&str; 3] = [UNIVERSAL_BASES[0], UNIVERSAL_BASES[1], resource_type];
        for base in lookup_order {
            if let Some(params) = self.params_by_type.get(base) {
                for (code, param) in params {
                    by_code.insert(code.as_str(), param);
                }
            }
        }

        by_code
            .into_values()
            .filter(|p| p.status.is_usable())
            .cloned()
            .collect()
    }

    /// Gets an active parameter by resource type and code.
    pub fn get_param(
        &self,
        resource_type: &str,
        code: &str,
    ) -> Option<Arc<SearchParameterDefinition>> {
        let lookup_order: [&str; 3] = [resource_type, UNIVERSAL_BASES[1], UNIVERSAL_BASES[0]];
        lookup_order
            .into_iter()
            .find_map(|base| self.params_by_type.get(base).and_then(|p| p.get(code)))
            .filter(|p| p.status.is_usable())
            .cloned()
    }

    /// Gets a parameter by its canonical URL.
    pub fn get_by_url(&self, url: &str) -> Option<Arc<SearchParameterDefinition>> {
        self.params_by_url.get(url).cloned()
    }

    fn register_internal(&mut self, param: SearchParameterDefinition) {
        let param = Arc::new(param);

        if let Some(previous) = self
            .params_by_url
            .insert(param.url.clone(), Arc::clone(&param))
        {
            tracing::debug!(url = %previous.url, "SearchParameter redefined in batch");
        }

        for base in param.base.iter().filter(|b| !b.trim().is_empty()) {
            let replaced = self
                .params_by_type
                .entry(base.clone())
                .or_default()
                .insert(param.code.clone(), Arc::clone(&param));
            if let Some(previous) = replaced {
                tracing::debug!(
                    resource_type = %base,
                    code = %param.code,
                    replaced_url = %previous.url,
                    "SearchParameter code overridden by later definition"
                );
            }
        }
    }

    /// Returns all resource types that have registered parameters.
    pub fn resource_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.params_by_type.keys().cloned().collect();
        types.sort();
        types
    }
}

impl std::fmt::Debug for SearchParameterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchParameterRegistry")
            .field("params_count", &self.params_by_url.len())
            .field(
                "resource_types",
                &self.params_by_type.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

//! Index builder.
//!
//! Turns a batch of resources and a batch of SearchParameter definitions into
//! a complete [`Snapshot`]. Expressions are evaluated per resource in
//! parallel; the results are merged in id order so identical input always
//! produces identical indexes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde_json::Value;

use crate::error::BuildError;
use crate::types::Resource;

use super::evaluator::PathEvaluator;
use super::normalizer::{IndexKey, normalize};
use super::registry::{SearchParameterDefinition, SearchParameterRegistry};
use super::snapshot::{ParamIndex, Snapshot, TypeIndexes, TypeRecords};

/// Keys extracted from one resource.
struct ResourceExtraction<'a> {
    id: &'a str,
    /// (parameter code, keys) for each parameter that produced keys.
    keys: Vec<(&'a str, Vec<IndexKey>)>,
    failures: usize,
}

/// Builds index snapshots using a [`PathEvaluator`].
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder<E> {
    evaluator: E,
}

impl<E: PathEvaluator> IndexBuilder<E> {
    /// Creates a builder around an evaluator.
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Returns the evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Builds a snapshot from a batch of resources and definitions.
    ///
    /// Fails without producing anything if the definition batch is invalid or
    /// any resource lacks a type or id. When two resources share a type and
    /// id, the later one replaces the earlier one and only the later one is
    /// indexed. A parameter whose expression fails for a resource is skipped
    /// for that resource and counted in the snapshot's statistics.
    pub fn build(
        &self,
        records: Vec<Value>,
        definitions: Vec<SearchParameterDefinition>,
        generation: u64,
    ) -> Result<Snapshot, BuildError> {
        let span = tracing::info_span!(
            "index_build",
            generation,
            records = records.len(),
            definitions = definitions.len()
        );
        let _guard = span.enter();
        let started = Instant::now();

        let registry = SearchParameterRegistry::from_definitions(definitions)?;
        let stored = self.store_records(records)?;

        let mut indexes: HashMap<String, TypeIndexes> = HashMap::new();
        let mut extraction_failures = 0;

        for (resource_type, type_records) in &stored {
            let params = registry.get_active_params(resource_type);
            if params.is_empty() {
                continue;
            }

            let extracted: Vec<ResourceExtraction<'_>> = type_records
                .par_iter()
                .map(|(id, resource)| self.extract_resource(id, resource, &params))
                .collect();

            let type_indexes = indexes.entry(resource_type.clone()).or_default();
            for extraction in extracted {
                extraction_failures += extraction.failures;
                for (code, keys) in extraction.keys {
                    let index = type_indexes
                        .entry(code.to_string())
                        .or_insert_with(ParamIndex::new);
                    for key in keys {
                        index.insert(key, extraction.id);
                    }
                }
            }
        }

        let snapshot =
            Snapshot::from_parts(generation, stored, indexes, registry, extraction_failures);

        let stats = snapshot.stats();
        tracing::info!(
            generation,
            resource_types = stats.per_type.len(),
            records = stats.total_records,
            index_entries = stats.total_index_entries,
            extraction_failures,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Index build complete"
        );

        Ok(snapshot)
    }

    /// Validates resources and groups them by type and id, last write wins.
    fn store_records(
        &self,
        records: Vec<Value>,
    ) -> Result<HashMap<String, TypeRecords>, BuildError> {
        let mut stored: HashMap<String, TypeRecords> = HashMap::new();

        for (position, content) in records.into_iter().enumerate() {
            let resource = Resource::from_json(content)
                .map_err(|message| BuildError::InvalidRecord { position, message })?;

            let type_records = stored.entry(resource.resource_type().to_string()).or_default();
            let id = resource.id().to_string();
            if type_records.insert(id, Arc::new(resource)).is_some() {
                tracing::debug!(position, "Duplicate resource id in batch, keeping later copy");
            }
        }

        Ok(stored)
    }

    fn extract_resource<'a>(
        &self,
        id: &'a str,
        resource: &Resource,
        params: &'a [Arc<SearchParameterDefinition>],
    ) -> ResourceExtraction<'a> {
        let mut extraction = ResourceExtraction {
            id,
            keys: Vec::new(),
            failures: 0,
        };

        for param in params {
            if param.expression.is_empty() {
                continue;
            }

            match self.evaluator.evaluate(resource.content(), &param.expression) {
                Ok(values) => {
                    let keys: Vec<IndexKey> = values
                        .iter()
                        .flat_map(|value| normalize(value, param.param_type))
                        .collect();
                    if !keys.is_empty() {
                        extraction.keys.push((param.code.as_str(), keys));
                    }
                }
                Err(e) => {
                    extraction.failures += 1;
                    tracing::debug!(
                        resource_type = %resource.resource_type(),
                        id,
                        param = %param.code,
                        error = %e,
                        "Skipping parameter for resource"
                    );
                }
            }
        }

        extraction
    }
}

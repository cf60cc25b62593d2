//! The engine facade: rebuild, read and search over the published snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::IndexConfig;
use crate::error::IndexResult;
use crate::records::load_records;
use crate::search::{
    IndexBuilder, IndexStats, PathEvaluator, QueryEvaluator, QueryOptions,
    SearchParameterDefinition, SearchParameterLoader, SimplePathEvaluator, Snapshot,
    SnapshotPublisher, TypeStats,
};
use crate::types::Resource;

/// Summary of a successful rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Generation of the published snapshot.
    pub generation: u64,
    /// Resources stored after duplicate ids were collapsed.
    pub record_count: usize,
    /// Per resource type statistics.
    pub per_type: BTreeMap<String, TypeStats>,
    /// Index entries across all types and parameters.
    pub index_entry_count: usize,
    /// Parameter evaluations skipped because they failed.
    pub extraction_failures: usize,
    /// Wall time of the build in milliseconds.
    pub duration_ms: u64,
}

/// In-memory search engine.
///
/// Queries run against whichever snapshot is current when they start. A
/// rebuild constructs a new snapshot off to the side and publishes it only if
/// the whole batch was valid.
pub struct SearchEngine<E = SimplePathEvaluator> {
    builder: IndexBuilder<E>,
    publisher: SnapshotPublisher,
    query: QueryEvaluator,
    rebuild_lock: Mutex<()>,
}

impl SearchEngine<SimplePathEvaluator> {
    /// Creates an engine with the built-in path evaluator.
    pub fn new() -> Self {
        Self::with_evaluator(SimplePathEvaluator::new())
    }
}

impl Default for SearchEngine<SimplePathEvaluator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PathEvaluator> SearchEngine<E> {
    /// Creates an engine around a caller-supplied path evaluator.
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            builder: IndexBuilder::new(evaluator),
            publisher: SnapshotPublisher::default(),
            query: QueryEvaluator::default(),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Replaces the query options.
    pub fn with_query_options(mut self, options: QueryOptions) -> Self {
        self.query = QueryEvaluator::new(options);
        self
    }

    /// Rebuilds the index from a full batch and publishes it.
    ///
    /// On error nothing is published and the previous snapshot stays current.
    /// Concurrent calls are serialized.
    pub fn rebuild(
        &self,
        records: Vec<Value>,
        definitions: Vec<SearchParameterDefinition>,
    ) -> IndexResult<BuildStats> {
        let _guard = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let started = Instant::now();
        let generation = self.publisher.generation() + 1;

        let snapshot = match self.builder.build(records, definitions, generation) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    generation,
                    current = self.publisher.generation(),
                    error = %e,
                    "Rebuild failed; keeping current snapshot"
                );
                return Err(e.into());
            }
        };

        let stats = snapshot.stats();
        let build_stats = BuildStats {
            generation,
            record_count: stats.total_records,
            per_type: stats.per_type.clone(),
            index_entry_count: stats.total_index_entries,
            extraction_failures: stats.extraction_failures,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        self.publisher.publish(snapshot);
        Ok(build_stats)
    }

    /// Loads parameters and records as configured, then rebuilds.
    pub fn rebuild_from_config(&self, config: &IndexConfig) -> IndexResult<BuildStats> {
        let loader = SearchParameterLoader::new();

        let mut definitions = Vec::new();
        if config.embedded_params {
            definitions.extend(loader.load_embedded());
        }
        if let Some(path) = &config.search_params {
            definitions.extend(loader.load_config(path)?);
        }

        let mut records = Vec::new();
        for path in &config.records {
            records.extend(load_records(path)?);
        }

        tracing::info!(
            definitions = definitions.len(),
            records = records.len(),
            files = config.records.len(),
            "Loaded rebuild inputs"
        );

        self.rebuild(records, definitions)
    }

    /// Returns the resource with the given type and id.
    pub fn read(&self, resource_type: &str, id: &str) -> Option<Arc<Resource>> {
        self.publisher.current().read(resource_type, id).cloned()
    }

    /// Returns resources of `resource_type` matching all query parameters.
    pub fn search<I, K, V>(&self, resource_type: &str, params: I) -> Vec<Arc<Resource>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let snapshot = self.publisher.current();
        self.query.search(&snapshot, resource_type, params)
    }

    /// Resource types that have stored records.
    pub fn list_record_types(&self) -> BTreeSet<String> {
        self.publisher.current().record_types()
    }

    /// Active search parameters for a resource type, ordered by code.
    pub fn list_search_parameters(
        &self,
        resource_type: &str,
    ) -> Vec<Arc<SearchParameterDefinition>> {
        self.publisher
            .current()
            .registry()
            .get_active_params(resource_type)
    }

    /// Statistics of the current snapshot.
    pub fn stats(&self) -> IndexStats {
        self.publisher.current().stats().clone()
    }

    /// The current snapshot, for running several queries against one state.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.publisher.current()
    }

    /// The query evaluator, for use with [`SearchEngine::snapshot`].
    pub fn query_evaluator(&self) -> &QueryEvaluator {
        &self.query
    }
}

impl<E> std::fmt::Debug for SearchEngine<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("publisher", &self.publisher)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

//! Index snapshots.
//!
//! A [`Snapshot`] holds everything one build produced: the stored resources,
//! the per-type, per-parameter indexes, and the registry they were built
//! from. Once published it is never mutated; a rebuild publishes a new one.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Resource;

use super::normalizer::IndexKey;
use super::registry::SearchParameterRegistry;

/// Index for one parameter of one resource type: key -> resource ids.
///
/// Id sets are never empty.
#[derive(Debug, Clone, Default)]
pub struct ParamIndex {
    entries: BTreeMap<IndexKey, BTreeSet<String>>,
}

impl ParamIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` under `key`. Returns false if the pair was already present.
    pub fn insert(&mut self, key: IndexKey, id: impl Into<String>) -> bool {
        self.entries.entry(key).or_default().insert(id.into())
    }

    /// Returns the ids stored under exactly `key`.
    pub fn get(&self, key: &IndexKey) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    /// Iterates over text keys starting with `prefix`, in key order.
    pub fn prefix<'a, 'p>(
        &'a self,
        prefix: &'p str,
    ) -> impl Iterator<Item = (&'a str, &'a BTreeSet<String>)> + use<'a, 'p> {
        self.entries
            .range(IndexKey::text(prefix)..)
            .map_while(move |(key, ids)| match key {
                IndexKey::Text(text) if text.starts_with(prefix) => Some((text.as_str(), ids)),
                _ => None,
            })
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&IndexKey, &BTreeSet<String>)> {
        self.entries.iter()
    }

    /// Returns the number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of (key, id) pairs.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Returns true if the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per resource type statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStats {
    /// Number of stored resources.
    pub count: usize,
    /// Number of parameters with at least one index entry.
    pub indexed_param_count: usize,
    /// Number of (key, id) pairs across all parameter indexes.
    pub index_entry_count: usize,
}

/// Statistics for a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Snapshot generation.
    pub generation: u64,
    /// Per resource type statistics.
    pub per_type: BTreeMap<String, TypeStats>,
    /// Total stored resources.
    pub total_records: usize,
    /// Total index entries.
    pub total_index_entries: usize,
    /// Parameter evaluations that failed and were skipped during the build.
    pub extraction_failures: usize,
}

/// Resources stored for one type, by id.
pub type TypeRecords = BTreeMap<String, Arc<Resource>>;

/// Parameter indexes for one type, by parameter code.
pub type TypeIndexes = HashMap<String, ParamIndex>;

/// An immutable, fully built index state.
#[derive(Debug)]
pub struct Snapshot {
    generation: u64,
    built_at: DateTime<Utc>,
    records: HashMap<String, TypeRecords>,
    indexes: HashMap<String, TypeIndexes>,
    registry: SearchParameterRegistry,
    stats: IndexStats,
}

impl Snapshot {
    /// Creates the empty generation-0 snapshot.
    pub fn empty() -> Self {
        Self::from_parts(
            0,
            HashMap::new(),
            HashMap::new(),
            SearchParameterRegistry::new(),
            0,
        )
    }

    /// Assembles a snapshot and computes its statistics.
    ///
    /// Empty parameter indexes are dropped.
    pub(crate) fn from_parts(
        generation: u64,
        records: HashMap<String, TypeRecords>,
        mut indexes: HashMap<String, TypeIndexes>,
        registry: SearchParameterRegistry,
        extraction_failures: usize,
    ) -> Self {
        for type_indexes in indexes.values_mut() {
            type_indexes.retain(|_, index| !index.is_empty());
        }
        indexes.retain(|_, type_indexes| !type_indexes.is_empty());

        let mut stats = IndexStats {
            generation,
            extraction_failures,
            ..IndexStats::default()
        };
        for (resource_type, type_records) in &records {
            let type_indexes = indexes.get(resource_type);
            let type_stats = TypeStats {
                count: type_records.len(),
                indexed_param_count: type_indexes.map(HashMap::len).unwrap_or(0),
                index_entry_count: type_indexes
                    .map(|idx| idx.values().map(ParamIndex::entry_count).sum())
                    .unwrap_or(0),
            };
            stats.total_records += type_stats.count;
            stats.total_index_entries += type_stats.index_entry_count;
            stats.per_type.insert(resource_type.clone(), type_stats);
        }

        Self {
            generation,
            built_at: Utc::now(),
            records,
            indexes,
            registry,
            stats,
        }
    }

    /// Returns the build generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns when this snapshot was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Returns the registry the indexes were built from.
    pub fn registry(&self) -> &SearchParameterRegistry {
        &self.registry
    }

    /// Returns the snapshot statistics.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Reads one resource.
    pub fn read(&self, resource_type: &str, id: &str) -> Option<&Arc<Resource>> {
        self.records.get(resource_type).and_then(|r| r.get(id))
    }

    /// Returns all resources of a type, by id.
    pub fn records_of(&self, resource_type: &str) -> Option<&TypeRecords> {
        self.records.get(resource_type)
    }

    /// Returns the index for a parameter of a type, if any values were indexed.
    pub fn index(&self, resource_type: &str, code: &str) -> Option<&ParamIndex> {
        self.indexes.get(resource_type).and_then(|i| i.get(code))
    }

    /// Returns the resource types that have stored resources.
    pub fn record_types(&self) -> BTreeSet<String> {
        self.records.keys().cloned().collect()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

//! Search parameter management, indexing and query evaluation.
//!
//! This module provides the moving parts of the index engine:
//!
//! - [`registry`] - Active SearchParameter definitions keyed by resource type
//! - [`loader`] - Loads definitions from the embedded table and JSON sources
//! - [`evaluator`] - Path expression evaluation over resource JSON
//! - [`normalizer`] - Conversion of extracted values into index keys
//! - [`builder`] - Builds an immutable [`Snapshot`] from a batch
//! - [`snapshot`] - Records, per-parameter indexes and build statistics
//! - [`query`] - Evaluates name/value queries against a snapshot
//! - [`publisher`] - Atomic swap of the current snapshot
//! - [`errors`] - Search-specific error types
//!
//! # Rebuild Lifecycle
//!
//! ```text
//! 1. Caller supplies records + SearchParameter definitions
//!    └── Registry built; invalid definitions abort the rebuild
//!
//! 2. IndexBuilder extracts and normalizes values per record
//!    └── Evaluation failures are skipped and counted
//!
//! 3. SnapshotPublisher swaps the new snapshot in
//!    └── In-flight queries keep the snapshot they started on
//! ```
//!
//! # Example
//!
//! ```
//! use helios_index::search::{
//!     IndexBuilder, QueryEvaluator, SearchParameterLoader, SimplePathEvaluator,
//! };
//! use serde_json::json;
//!
//! let definitions = SearchParameterLoader::new().load_embedded();
//! let records = vec![json!({"resourceType": "Patient", "id": "1", "gender": "male"})];
//!
//! let snapshot = IndexBuilder::new(SimplePathEvaluator::new())
//!     .build(records, definitions, 1)
//!     .unwrap();
//!
//! let results = QueryEvaluator::default().search(&snapshot, "Patient", [("gender", "male")]);
//! assert_eq!(results.len(), 1);
//! ```

pub mod builder;
pub mod errors;
pub mod evaluator;
pub mod loader;
pub mod normalizer;
pub mod publisher;
pub mod query;
pub mod registry;
pub mod snapshot;

// Re-export main types
pub use builder::IndexBuilder;
pub use errors::{ExtractionError, LoaderError, RegistryError};
pub use evaluator::{PathEvaluator, SimplePathEvaluator};
pub use loader::SearchParameterLoader;
pub use normalizer::{IndexKey, NumberKey, normalize};
pub use publisher::SnapshotPublisher;
pub use query::{QueryEvaluator, QueryOptions};
pub use registry::{
    SearchParameterDefinition, SearchParameterRegistry, SearchParameterSource,
    SearchParameterStatus,
};
pub use snapshot::{IndexStats, ParamIndex, Snapshot, TypeStats};

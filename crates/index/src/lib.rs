//! Helios In-Memory FHIR Search Index
//!
//! This crate holds a collection of FHIR resources in memory and answers
//! search queries against secondary indexes derived from SearchParameter
//! definitions. Which fields are indexed, and how, is entirely data-driven:
//! supplying a different set of definitions changes the indexes without
//! changing code.
//!
//! # Architecture
//!
//! - [`types`] - Resources and search parameter type enums
//! - [`search`] - Registry, loader, path evaluation, normalization, index
//!   building, query evaluation and snapshot publication
//! - [`engine`] - The [`SearchEngine`] facade
//! - [`records`] - Record file loading (Bundle, array, resource, NDJSON)
//! - [`config`] - [`IndexConfig`] with environment variable overrides
//! - [`error`] - Error types for rebuilds
//!
//! # Quick Start
//!
//! ```
//! use helios_index::SearchEngine;
//! use helios_index::search::SearchParameterLoader;
//! use serde_json::json;
//!
//! let engine = SearchEngine::new();
//! engine
//!     .rebuild(
//!         vec![
//!             json!({"resourceType": "Patient", "id": "1", "gender": "male"}),
//!             json!({"resourceType": "Patient", "id": "2", "gender": "female"}),
//!         ],
//!         SearchParameterLoader::new().load_embedded(),
//!     )
//!     .unwrap();
//!
//! let males = engine.search("Patient", [("gender", "male")]);
//! assert_eq!(males.len(), 1);
//! assert_eq!(males[0].id(), "1");
//! ```
//!
//! # Snapshots
//!
//! Each rebuild produces an immutable [`search::Snapshot`] which is swapped in
//! atomically. A query observes exactly one snapshot from start to finish, so
//! a rebuild running alongside it can never produce a mixed result.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod records;
pub mod search;
pub mod types;

pub use config::IndexConfig;
pub use engine::{BuildStats, SearchEngine};
pub use error::{BuildError, IndexError, IndexResult};
pub use types::{Resource, SearchModifier, SearchParamType};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence when set.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("helios_index={},index_cli={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

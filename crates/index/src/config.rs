//! Engine configuration.
//!
//! Supports both programmatic configuration and environment variable
//! overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `INDEX_RECORDS` | (none) | Record files, comma-separated |
//! | `INDEX_SEARCH_PARAMS` | (none) | SearchParameter file (Bundle, array or resource) |
//! | `INDEX_EMBEDDED_PARAMS` | true | Include the embedded core parameters |
//! | `INDEX_RESERVED_PREFIX` | _ | Prefix of reserved query parameter names |
//! | `INDEX_LOG_LEVEL` | info | Log level |
//!
//! # Example
//!
//! ```rust
//! use helios_index::IndexConfig;
//!
//! let config = IndexConfig {
//!     reserved_prefix: "$".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::search::QueryOptions;

/// Configuration for loading and querying an index.
#[derive(Debug, Clone, Parser)]
#[command(name = "index-cli")]
#[command(about = "In-memory FHIR search index")]
pub struct IndexConfig {
    /// Record files to index (Bundle, JSON array, single resource or NDJSON).
    #[arg(long, env = "INDEX_RECORDS", num_args = 1.., value_delimiter = ',')]
    pub records: Vec<PathBuf>,

    /// SearchParameter definitions file.
    #[arg(long, env = "INDEX_SEARCH_PARAMS")]
    pub search_params: Option<PathBuf>,

    /// Include the embedded core SearchParameters.
    #[arg(
        long,
        env = "INDEX_EMBEDDED_PARAMS",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub embedded_params: bool,

    /// Query parameter names with this prefix are reserved and ignored.
    #[arg(long, env = "INDEX_RESERVED_PREFIX", default_value = "_")]
    pub reserved_prefix: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "INDEX_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            search_params: None,
            embedded_params: true,
            reserved_prefix: "_".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl IndexConfig {
    /// Creates a new IndexConfig from environment variables.
    pub fn from_env() -> Self {
        Self::try_parse_from(["index-cli"]).unwrap_or_default()
    }

    /// Query options derived from this configuration.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            reserved_prefix: self.reserved_prefix.clone(),
            ..QueryOptions::default()
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.reserved_prefix.is_empty() {
            errors.push("Reserved prefix cannot be empty".to_string());
        }

        if !self.embedded_params && self.search_params.is_none() {
            errors.push(
                "No SearchParameter source: enable embedded params or set --search-params"
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

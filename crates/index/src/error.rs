//! Error types for the index engine.
//!
//! Fatal errors abort a rebuild as a whole and leave the previously published
//! snapshot in force. Per-record extraction failures and per-value
//! normalization misses are not errors at this level; they are skipped and
//! counted by the builder.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::search::{LoaderError, RegistryError};

/// The primary error type for engine operations.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Index build errors
    #[error(transparent)]
    Build(#[from] BuildError),

    /// SearchParameter loading errors
    #[error(transparent)]
    Loader(#[from] LoaderError),
}

/// Errors that invalidate an input batch.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A record in the batch could not be indexed at all.
    #[error("invalid record at position {position}: {message}")]
    InvalidRecord { position: usize, message: String },

    /// The SearchParameter batch is structurally invalid.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for engine operations.
pub type IndexResult<T> = Result<T, IndexError>;

//! Search-specific error types.
//!
//! This module provides error types for search parameter operations:
//! - Loading and parsing SearchParameter resources
//! - Registry construction
//! - Path expression evaluation

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error during SearchParameter loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoaderError {
    /// Invalid SearchParameter resource structure.
    InvalidResource {
        /// Description of what was invalid.
        message: String,
        /// URL of the problematic parameter, if known.
        url: Option<String>,
    },

    /// Missing required field in SearchParameter.
    MissingField {
        /// Name of the missing field.
        field: String,
        /// URL of the parameter.
        url: Option<String>,
    },

    /// Failed to read config file.
    ConfigLoadFailed {
        /// Path to the config file.
        path: String,
        /// Error message.
        message: String,
    },

    /// Failed to read or parse a record file.
    RecordLoadFailed {
        /// Path to the record file.
        path: String,
        /// Error message.
        message: String,
    },
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::InvalidResource { message, url } => {
                if let Some(url) = url {
                    write!(f, "Invalid SearchParameter '{}': {}", url, message)
                } else {
                    write!(f, "Invalid SearchParameter: {}", message)
                }
            }
            LoaderError::MissingField { field, url } => {
                if let Some(url) = url {
                    write!(
                        f,
                        "SearchParameter '{}' missing required field '{}'",
                        url, field
                    )
                } else {
                    write!(f, "SearchParameter missing required field '{}'", field)
                }
            }
            LoaderError::ConfigLoadFailed { path, message } => {
                write!(f, "Failed to load config from '{}': {}", path, message)
            }
            LoaderError::RecordLoadFailed { path, message } => {
                write!(f, "Failed to load records from '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for LoaderError {}

/// Error during registry construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegistryError {
    /// Invalid parameter definition.
    InvalidDefinition {
        /// URL of the offending definition.
        url: String,
        /// Description of the problem.
        message: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidDefinition { url, message } => {
                write!(f, "Invalid SearchParameter definition '{}': {}", url, message)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Error during value extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractionError {
    /// The expression could not be evaluated against this resource.
    FhirPathError {
        /// The expression that failed.
        expression: String,
        /// The error message from the evaluator.
        message: String,
    },

    /// Resource is not a valid JSON object.
    InvalidResource {
        /// Description of the problem.
        message: String,
    },
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::FhirPathError {
                expression,
                message,
            } => {
                write!(f, "FHIRPath error evaluating '{}': {}", expression, message)
            }
            ExtractionError::InvalidResource { message } => {
                write!(f, "Invalid resource: {}", message)
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

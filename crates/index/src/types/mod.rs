//! Core types for indexed resources and search parameters.
//!
//! - [`Resource`] - an indexed FHIR resource with its type and logical id
//! - [`SearchParamType`] - the value type declared by a SearchParameter
//! - [`SearchModifier`] - the query-time modifiers understood by the evaluator

mod resource;
mod search_params;

pub use resource::Resource;
pub use search_params::{SearchModifier, SearchParamType};

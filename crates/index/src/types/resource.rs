//! Indexed resource type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A FHIR resource held by an index snapshot.
///
/// The resource type and logical id are lifted out of the JSON content when
/// the resource is indexed; the content itself is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    resource_type: String,
    id: String,
    content: Value,
}

impl Resource {
    /// Creates a resource from its parts.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>, content: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            content,
        }
    }

    /// Builds a resource from JSON, reading `resourceType` and `id`.
    ///
    /// Returns `Err` with a description when either field is missing, empty,
    /// or not a string.
    pub fn from_json(content: Value) -> Result<Self, String> {
        let resource_type = match content.get("resourceType").and_then(|v| v.as_str()) {
            Some(rt) if !rt.is_empty() => rt.to_string(),
            _ => return Err("missing resourceType".to_string()),
        };
        let id = match content.get("id").and_then(|v| v.as_str()) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(format!("{} resource missing id", resource_type)),
        };
        Ok(Self::new(resource_type, id, content))
    }

    /// Returns the resource type (e.g., "Patient").
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the logical id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the JSON content.
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Returns the relative URL (`Type/id`).
    pub fn url(&self) -> String {
        format!("{}/{}", self.resource_type, self.id)
    }
}

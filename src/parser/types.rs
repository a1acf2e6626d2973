//! Shared types for catalog-object descriptors.
//!
//! This module defines the data structures used to describe catalog objects
//! and their metadata entries, as exported by the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label marking a metadata entry as a dependency reference.
pub const DEPENDS_ON_LABEL: &str = "depends_on";

/// A single metadata entry attached to a catalog object.
///
/// Dependency references are entries whose `label` is the depends-on label;
/// their `key` holds the `<bucket><separator><object>` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// The entry key.
    pub key: String,

    /// The entry value.
    #[serde(default)]
    pub value: String,

    /// The entry label (e.g. "depends_on", "General", "job_information").
    #[serde(default)]
    pub label: String,
}

impl Metadata {
    /// Creates a new metadata entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            label: label.into(),
        }
    }

    /// Creates a depends-on entry pointing at `reference`.
    pub fn depends_on(reference: impl Into<String>) -> Self {
        Self::new(reference, "latest", DEPENDS_ON_LABEL)
    }
}

/// Describes one catalog object as seen by the graph builder.
///
/// # Example
///
/// ```
/// use catalog_callgraph::parser::types::{Metadata, ObjectDescriptor};
///
/// let object = ObjectDescriptor::new("basic-examples", "Deploy", "workflow/standard")
///     .with_metadata(Metadata::depends_on("basic-examples/Cleanup"));
///
/// assert_eq!(object.dependency_references("depends_on"), vec!["basic-examples/Cleanup"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// The bucket holding this object.
    pub bucket_name: String,

    /// The object name.
    pub name: String,

    /// The object kind (e.g. "workflow/standard").
    #[serde(default)]
    pub kind: String,

    /// All metadata entries of the object.
    #[serde(default, rename = "metadata", alias = "object_key_values")]
    pub metadata_list: Vec<Metadata>,
}

impl ObjectDescriptor {
    /// Creates a descriptor without metadata.
    pub fn new(
        bucket_name: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            name: name.into(),
            kind: kind.into(),
            metadata_list: Vec::new(),
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata_list.push(metadata);
        self
    }

    /// Returns the raw dependency references, i.e. the keys of all entries
    /// labelled `label`, in declaration order.
    pub fn dependency_references(&self, label: &str) -> Vec<&str> {
        self.metadata_list
            .iter()
            .filter(|metadata| metadata.label == label)
            .map(|metadata| metadata.key.as_str())
            .collect()
    }

    /// Returns true if the object declares at least one dependency.
    pub fn has_dependencies(&self, label: &str) -> bool {
        self.metadata_list.iter().any(|metadata| metadata.label == label)
    }
}

impl fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.bucket_name, self.name, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_references_filters_by_label() {
        let object = ObjectDescriptor::new("bucket", "wf", "workflow")
            .with_metadata(Metadata::new("project_name", "demo", "General"))
            .with_metadata(Metadata::depends_on("bucket/a"))
            .with_metadata(Metadata::depends_on("other/b"));

        assert_eq!(
            object.dependency_references(DEPENDS_ON_LABEL),
            vec!["bucket/a", "other/b"]
        );
        assert!(object.has_dependencies(DEPENDS_ON_LABEL));
        assert!(object.dependency_references("calls").is_empty());
    }

    #[test]
    fn test_no_dependencies() {
        let object = ObjectDescriptor::new("bucket", "wf", "workflow")
            .with_metadata(Metadata::new("project_name", "demo", "General"));
        assert!(!object.has_dependencies(DEPENDS_ON_LABEL));
    }

    #[test]
    fn test_descriptor_display() {
        let object = ObjectDescriptor::new("bucket", "wf", "workflow/standard");
        assert_eq!(format!("{}", object), "bucket/wf (workflow/standard)");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"bucket_name": "b", "name": "o"}"#;
        let object: ObjectDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(object.kind, "");
        assert!(object.metadata_list.is_empty());
    }

    #[test]
    fn test_deserialize_object_key_values_alias() {
        let json = r#"{
            "bucket_name": "b",
            "name": "o",
            "kind": "workflow",
            "object_key_values": [{"key": "b/x", "value": "latest", "label": "depends_on"}]
        }"#;
        let object: ObjectDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(object.dependency_references(DEPENDS_ON_LABEL), vec!["b/x"]);
    }
}

//! Node identity for the dependency graph.
//!
//! A [`GraphNode`] is identified by its bucket name and object name only.
//! The object kind and the "exists in catalog" flag are descriptive payload
//! and never take part in equality, hashing or ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{GraphError, GraphResult};

/// Kind recorded for referenced objects that do not exist in the catalog.
pub const KIND_NOT_FOUND: &str = "N/A";

/// The identity part of a [`GraphNode`].
///
/// Ordering is by bucket name, then object name, which is the presentation
/// order used by reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    /// Bucket holding the catalog object
    pub bucket_name: String,
    /// Catalog object name
    pub object_name: String,
}

impl NodeKey {
    /// Creates a new key.
    pub fn new(bucket_name: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_name: object_name.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket_name, self.object_name)
    }
}

/// A catalog object as seen from the dependency graph.
///
/// # Example
///
/// ```rust
/// use catalog_callgraph::graph::GraphNode;
///
/// let a = GraphNode::new("basic-examples", "Hello_World", "workflow/standard", true).unwrap();
/// let b = GraphNode::new("basic-examples", "Hello_World", "N/A", false).unwrap();
///
/// // Same bucket and object: same node, whatever the payload says.
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "basic-examples/Hello_World");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    #[serde(flatten)]
    key: NodeKey,
    object_kind: String,
    is_in_catalog: bool,
}

impl GraphNode {
    /// Creates a new node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] if `bucket_name` or
    /// `object_name` is empty.
    pub fn new(
        bucket_name: impl Into<String>,
        object_name: impl Into<String>,
        object_kind: impl Into<String>,
        is_in_catalog: bool,
    ) -> GraphResult<Self> {
        let bucket_name = bucket_name.into();
        let object_name = object_name.into();

        if bucket_name.trim().is_empty() {
            return Err(GraphError::InvalidArgument(format!(
                "bucket name is empty (object '{}')",
                object_name
            )));
        }
        if object_name.trim().is_empty() {
            return Err(GraphError::InvalidArgument(format!(
                "object name is empty (bucket '{}')",
                bucket_name
            )));
        }

        Ok(Self {
            key: NodeKey {
                bucket_name,
                object_name,
            },
            object_kind: object_kind.into(),
            is_in_catalog,
        })
    }

    /// Creates a node for a referenced object that is absent from the catalog.
    pub fn missing(
        bucket_name: impl Into<String>,
        object_name: impl Into<String>,
    ) -> GraphResult<Self> {
        Self::new(bucket_name, object_name, KIND_NOT_FOUND, false)
    }

    /// Returns the identity of this node.
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn bucket_name(&self) -> &str {
        &self.key.bucket_name
    }

    pub fn object_name(&self) -> &str {
        &self.key.object_name
    }

    pub fn object_kind(&self) -> &str {
        &self.object_kind
    }

    pub fn is_in_catalog(&self) -> bool {
        self.is_in_catalog
    }
}

impl PartialEq for GraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for GraphNode {}

impl Hash for GraphNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for GraphNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GraphNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.key, f)
    }
}

//! Point-query view of one object's direct dependencies and dependents.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::graph::{DependencyGraph, NodeKey};
use crate::parser::DependencyReference;

/// A direct dependency of the queried object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependsOnObject {
    pub bucket_and_object_name: String,
    pub object_kind: String,
    pub is_in_catalog: bool,
}

/// What an object depends on and what calls it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDependencies {
    pub depends_on: Vec<DependsOnObject>,
    pub called_by: Vec<String>,
}

/// Lists the direct dependencies and dependents of `key`, with names joined
/// by `separator`. Both lists are sorted by bucket then object name.
///
/// # Errors
///
/// Returns [`GraphError::UnknownNode`] if `key` is not in the graph.
///
/// # Example
///
/// ```
/// use catalog_callgraph::analysis::object_dependencies;
/// use catalog_callgraph::graph::{DependencyGraph, GraphNode, NodeKey};
///
/// let mut graph = DependencyGraph::new();
/// graph.add_node(GraphNode::new("b", "deploy", "workflow", true).unwrap());
/// graph.add_node(GraphNode::missing("b", "gone").unwrap());
/// graph.add_edge(&NodeKey::new("b", "deploy"), &NodeKey::new("b", "gone")).unwrap();
///
/// let view = object_dependencies(&graph, &NodeKey::new("b", "deploy"), "/").unwrap();
/// assert_eq!(view.depends_on[0].bucket_and_object_name, "b/gone");
/// assert!(!view.depends_on[0].is_in_catalog);
/// assert!(view.called_by.is_empty());
/// ```
pub fn object_dependencies(
    graph: &DependencyGraph,
    key: &NodeKey,
    separator: &str,
) -> GraphResult<ObjectDependencies> {
    if !graph.contains(key) {
        return Err(GraphError::UnknownNode(key.to_string()));
    }

    let depends_on = graph
        .get_dependencies(key)
        .into_iter()
        .map(|node| DependsOnObject {
            bucket_and_object_name: DependencyReference::join(
                node.bucket_name(),
                node.object_name(),
                separator,
            ),
            object_kind: node.object_kind().to_string(),
            is_in_catalog: node.is_in_catalog(),
        })
        .collect();

    let called_by = graph
        .get_dependents(key)
        .into_iter()
        .map(|node| DependencyReference::join(node.bucket_name(), node.object_name(), separator))
        .collect();

    Ok(ObjectDependencies {
        depends_on,
        called_by,
    })
}

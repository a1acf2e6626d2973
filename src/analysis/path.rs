//! Directed paths through a dependency graph.

use serde::Serialize;
use std::fmt;

use crate::error::{GraphError, GraphResult};
use crate::graph::GraphNode;

/// A non-empty sequence of nodes where each node depends on the next one.
///
/// # Example
///
/// ```
/// use catalog_callgraph::analysis::GraphPath;
/// use catalog_callgraph::graph::GraphNode;
///
/// let path = GraphPath::new(vec![
///     GraphNode::new("b", "deploy", "workflow", true).unwrap(),
///     GraphNode::new("b", "build", "workflow", true).unwrap(),
/// ])
/// .unwrap();
///
/// assert_eq!(path.length(), 1);
/// assert_eq!(path.start_vertex().object_name(), "deploy");
/// assert_eq!(path.to_string(), "b/deploy -> b/build");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GraphPath {
    nodes: Vec<GraphNode>,
}

impl GraphPath {
    /// Creates a path over `nodes`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] if `nodes` is empty.
    pub fn new(nodes: Vec<GraphNode>) -> GraphResult<Self> {
        if nodes.is_empty() {
            return Err(GraphError::InvalidArgument(
                "a path needs at least one node".to_string(),
            ));
        }
        Ok(Self { nodes })
    }

    /// The nodes in walk order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Number of edges; a single-node path has length 0.
    pub fn length(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn start_vertex(&self) -> &GraphNode {
        &self.nodes[0]
    }

    pub fn end_vertex(&self) -> &GraphNode {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Consecutive node pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode)> {
        self.nodes.windows(2).map(|pair| (&pair[0], &pair[1]))
    }
}

impl fmt::Display for GraphPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, node) in self.nodes.iter().enumerate() {
            if position > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

//! Graph module for depends-on relationships between catalog objects.
//!
//! This module provides the [`DependencyGraph`] struct and its node type
//! [`GraphNode`]. A graph is built fresh for every analysis request and
//! dropped afterwards; nothing here is shared between requests.
//!
//! # Example
//!
//! ```rust
//! use catalog_callgraph::graph::{DependencyGraph, GraphNode, NodeKey};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_node(GraphNode::new("basic-examples", "Deploy", "workflow/standard", true).unwrap());
//! graph.add_node(GraphNode::missing("basic-examples", "Cleanup").unwrap());
//! graph
//!     .add_edge(&NodeKey::new("basic-examples", "Deploy"), &NodeKey::new("basic-examples", "Cleanup"))
//!     .unwrap();
//!
//! assert_eq!(graph.order(), 2);
//! assert_eq!(graph.size(), 1);
//! ```

mod dependency_graph;
mod node;

pub use dependency_graph::{CycleInfo, DependencyGraph};
pub use node::{GraphNode, NodeKey, KIND_NOT_FOUND};

//! Path analysis over a dependency graph.
//!
//! This module finds the roots and leaves of a graph, enumerates the paths
//! between them and groups those paths into one call graph per root.
//!
//! # Features
//!
//! - Root/leaf discovery per weakly connected component
//! - Deterministic enumeration of simple root-to-leaf paths
//! - Cycles folded into a single synthetic path
//! - Per-root call graph and diameter (longest path length)
//! - Direct depends-on / called-by view for one object
//!
//! # Example
//!
//! ```
//! use catalog_callgraph::analysis::PathAnalyzer;
//! use catalog_callgraph::graph::{DependencyGraph, GraphNode, NodeKey};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_node(GraphNode::new("b", "deploy", "workflow", true).unwrap());
//! graph.add_node(GraphNode::new("b", "build", "workflow", true).unwrap());
//! graph.add_edge(&NodeKey::new("b", "deploy"), &NodeKey::new("b", "build")).unwrap();
//!
//! let analysis = PathAnalyzer::new(&graph).analyze();
//! for root in analysis.roots() {
//!     println!("{}: diameter {}", root, analysis.diameters[root]);
//! }
//! ```

pub mod analyzer;
pub mod dependencies;
pub mod path;

pub use analyzer::{
    call_graphs, diameter_per_root, group_by_root, CallGraphAnalysis, PathAnalyzer, PathsByRoot,
    RootsAndLeaves,
};
pub use dependencies::{object_dependencies, DependsOnObject, ObjectDependencies};
pub use path::GraphPath;

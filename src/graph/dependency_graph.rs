//! Dependency graph implementation using petgraph.
//!
//! Provides a directed graph of catalog objects where an edge `a -> b` means
//! "a depends on b". Nodes are unique by [`NodeKey`]; self-loops and cycles are
//! allowed and tolerated by every query.

use petgraph::algo::kosaraju_scc;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use super::node::{GraphNode, NodeKey};
use crate::error::{GraphError, GraphResult};

/// A directed graph representing depends-on relationships between catalog objects.
///
/// The graph uses petgraph's `StableDiGraph` internally so that node indices
/// stay valid when other nodes are removed. A side table maps each
/// [`NodeKey`] to its index, so lookups never go through object references.
///
/// # Example
///
/// ```rust
/// use catalog_callgraph::graph::{DependencyGraph, GraphNode};
///
/// let mut graph = DependencyGraph::new();
/// let app = graph.add_node(GraphNode::new("apps", "deploy", "workflow", true).unwrap()).key().clone();
/// let lib = graph.add_node(GraphNode::new("libs", "notify", "workflow", true).unwrap()).key().clone();
///
/// graph.add_edge(&app, &lib).unwrap();
///
/// assert_eq!(graph.order(), 2);
/// assert_eq!(graph.size(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: StableDiGraph<GraphNode, ()>,
    /// Maps node identities to their indices for O(1) lookup
    node_indices: HashMap<NodeKey, NodeIndex>,
}

impl DependencyGraph {
    /// Creates a new empty dependency graph.
    ///
    /// # Example
    ///
    /// ```rust
    /// use catalog_callgraph::graph::DependencyGraph;
    ///
    /// let graph = DependencyGraph::new();
    /// assert_eq!(graph.order(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new graph with pre-allocated capacity.
    ///
    /// # Arguments
    ///
    /// * `nodes` - Expected number of nodes
    /// * `edges` - Expected number of edges
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: StableDiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
        }
    }

    /// Adds a node to the graph.
    ///
    /// If a node with the same identity already exists, the existing node is
    /// returned unchanged and the new payload is discarded.
    ///
    /// # Example
    ///
    /// ```rust
    /// use catalog_callgraph::graph::{DependencyGraph, GraphNode};
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node(GraphNode::new("b", "o", "workflow", true).unwrap());
    /// let kept = graph.add_node(GraphNode::new("b", "o", "N/A", false).unwrap());
    ///
    /// assert_eq!(kept.object_kind(), "workflow");
    /// assert_eq!(graph.order(), 1);
    /// ```
    pub fn add_node(&mut self, node: GraphNode) -> &GraphNode {
        let idx = self.insert(node);
        &self.graph[idx]
    }

    /// Inserts a node if absent and returns its index.
    pub(crate) fn insert(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(node.key()) {
            return idx;
        }

        let key = node.key().clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(key, idx);
        idx
    }

    /// Removes a node and every edge touching it.
    ///
    /// # Returns
    ///
    /// `true` if the node existed.
    pub fn remove_node(&mut self, key: &NodeKey) -> bool {
        match self.node_indices.remove(key) {
            Some(idx) => self.graph.remove_node(idx).is_some(),
            None => false,
        }
    }

    /// Adds a depends-on edge from `from` to `to`.
    ///
    /// Both nodes must already exist in the graph. Adding an edge that is
    /// already present leaves the graph unchanged.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the edge was added, `Ok(false)` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if either endpoint is missing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use catalog_callgraph::graph::{DependencyGraph, GraphNode, NodeKey};
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node(GraphNode::new("b", "caller", "workflow", true).unwrap());
    /// graph.add_node(GraphNode::new("b", "callee", "workflow", true).unwrap());
    ///
    /// let caller = NodeKey::new("b", "caller");
    /// let callee = NodeKey::new("b", "callee");
    /// assert!(graph.add_edge(&caller, &callee).unwrap());
    /// assert!(!graph.add_edge(&caller, &callee).unwrap());
    /// assert!(graph.add_edge(&caller, &NodeKey::new("b", "nonexistent")).is_err());
    /// ```
    pub fn add_edge(&mut self, from: &NodeKey, to: &NodeKey) -> GraphResult<bool> {
        let from_idx = self.require(from)?;
        let to_idx = self.require(to)?;

        if self.graph.contains_edge(from_idx, to_idx) {
            return Ok(false);
        }
        self.graph.add_edge(from_idx, to_idx, ());
        Ok(true)
    }

    /// Removes the edge from `from` to `to`.
    ///
    /// # Returns
    ///
    /// `true` if the edge existed.
    pub fn remove_edge(&mut self, from: &NodeKey, to: &NodeKey) -> bool {
        let (Some(&from_idx), Some(&to_idx)) =
            (self.node_indices.get(from), self.node_indices.get(to))
        else {
            return false;
        };

        match self.graph.find_edge(from_idx, to_idx) {
            Some(edge) => self.graph.remove_edge(edge).is_some(),
            None => false,
        }
    }

    /// Returns the number of nodes in the graph.
    pub fn order(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn size(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Checks if a node exists in the graph.
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.node_indices.contains_key(key)
    }

    /// Checks if the edge `from -> to` exists.
    pub fn contains_edge(&self, from: &NodeKey, to: &NodeKey) -> bool {
        match (self.node_indices.get(from), self.node_indices.get(to)) {
            (Some(&from_idx), Some(&to_idx)) => self.graph.contains_edge(from_idx, to_idx),
            _ => false,
        }
    }

    /// Gets a reference to a node by identity.
    pub fn get_node(&self, key: &NodeKey) -> Option<&GraphNode> {
        self.node_indices
            .get(key)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Iterates over all nodes. Iteration order is unspecified.
    pub fn node_set(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Returns all edges as `(source, target)` pairs. Order is unspecified.
    pub fn edge_set(&self) -> Vec<(&GraphNode, &GraphNode)> {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .map(|(source, target)| (&self.graph[source], &self.graph[target]))
            .collect()
    }

    /// Returns the number of objects depending on `key`, or `None` if absent.
    pub fn in_degree(&self, key: &NodeKey) -> Option<usize> {
        self.node_indices
            .get(key)
            .map(|&idx| self.degree(idx, Direction::Incoming))
    }

    /// Returns the number of objects `key` depends on, or `None` if absent.
    pub fn out_degree(&self, key: &NodeKey) -> Option<usize> {
        self.node_indices
            .get(key)
            .map(|&idx| self.degree(idx, Direction::Outgoing))
    }

    /// Gets the direct dependencies of an object (outgoing edges).
    ///
    /// Results are sorted by bucket then object name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use catalog_callgraph::graph::{DependencyGraph, GraphNode, NodeKey};
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node(GraphNode::new("b", "app", "workflow", true).unwrap());
    /// graph.add_node(GraphNode::new("b", "lib", "workflow", true).unwrap());
    /// graph.add_edge(&NodeKey::new("b", "app"), &NodeKey::new("b", "lib")).unwrap();
    ///
    /// let deps = graph.get_dependencies(&NodeKey::new("b", "app"));
    /// assert_eq!(deps.len(), 1);
    /// assert_eq!(deps[0].object_name(), "lib");
    /// ```
    pub fn get_dependencies(&self, key: &NodeKey) -> Vec<&GraphNode> {
        self.neighbors_of(key, Direction::Outgoing)
    }

    /// Gets the objects that directly depend on `key` (incoming edges).
    ///
    /// Results are sorted by bucket then object name.
    pub fn get_dependents(&self, key: &NodeKey) -> Vec<&GraphNode> {
        self.neighbors_of(key, Direction::Incoming)
    }

    /// Checks if the graph contains cycles, self-loops included.
    ///
    /// # Example
    ///
    /// ```rust
    /// use catalog_callgraph::graph::{DependencyGraph, GraphNode, NodeKey};
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node(GraphNode::new("b", "a", "workflow", true).unwrap());
    /// graph.add_edge(&NodeKey::new("b", "a"), &NodeKey::new("b", "a")).unwrap();
    ///
    /// assert!(graph.has_cycles());
    /// ```
    pub fn has_cycles(&self) -> bool {
        !self.cyclic_components().is_empty()
    }

    /// Detects every cyclic strongly connected component.
    ///
    /// A component is cyclic if it has more than one node, or if it is a
    /// single node with a self-loop. Nodes inside each cycle are sorted by
    /// bucket then object name, and cycles are sorted by their first node.
    pub fn detect_cycles(&self) -> Vec<CycleInfo> {
        let mut cycles: Vec<CycleInfo> = self
            .cyclic_components()
            .into_iter()
            .map(|scc| {
                let mut nodes: Vec<GraphNode> =
                    scc.into_iter().map(|idx| self.graph[idx].clone()).collect();
                nodes.sort();
                CycleInfo { nodes }
            })
            .collect();

        cycles.sort_by(|a, b| a.nodes.first().cmp(&b.nodes.first()));
        cycles
    }

    /// Returns the identities of all nodes that are part of any cycle.
    ///
    /// # Example
    ///
    /// ```rust
    /// use catalog_callgraph::graph::{DependencyGraph, GraphNode, NodeKey};
    ///
    /// let mut graph = DependencyGraph::new();
    /// for name in ["a", "b", "c", "d"] {
    ///     graph.add_node(GraphNode::new("bucket", name, "workflow", true).unwrap());
    /// }
    /// let key = |name: &str| NodeKey::new("bucket", name);
    /// graph.add_edge(&key("a"), &key("b")).unwrap();
    /// graph.add_edge(&key("b"), &key("c")).unwrap();
    /// graph.add_edge(&key("c"), &key("a")).unwrap();
    /// graph.add_edge(&key("a"), &key("d")).unwrap();
    ///
    /// let cyclic = graph.nodes_in_cycles();
    /// assert!(cyclic.contains(&key("a")));
    /// assert!(!cyclic.contains(&key("d")));
    /// ```
    pub fn nodes_in_cycles(&self) -> HashSet<NodeKey> {
        self.cyclic_components()
            .into_iter()
            .flatten()
            .map(|idx| self.graph[idx].key().clone())
            .collect()
    }

    /// Builds a new graph over `nodes`, keeping only the listed `edges`.
    ///
    /// Node payloads are copied from this graph. Keys absent from this graph
    /// are ignored, as are edges that do not exist here or whose endpoints
    /// are not in `nodes`.
    pub fn subgraph<'a, N, E>(&self, nodes: N, edges: E) -> DependencyGraph
    where
        N: IntoIterator<Item = &'a NodeKey>,
        E: IntoIterator<Item = (&'a NodeKey, &'a NodeKey)>,
    {
        let mut subgraph = DependencyGraph::new();
        for key in nodes {
            if let Some(node) = self.get_node(key) {
                subgraph.insert(node.clone());
            }
        }

        for (from, to) in edges {
            if self.contains_edge(from, to) && subgraph.contains(from) && subgraph.contains(to) {
                // Both endpoints were checked just above.
                let _ = subgraph.add_edge(from, to);
            }
        }

        subgraph
    }

    /// Builds the subgraph induced by `nodes`: those nodes plus every edge of
    /// this graph between them.
    pub fn induced_subgraph<'a, N>(&self, nodes: N) -> DependencyGraph
    where
        N: IntoIterator<Item = &'a NodeKey>,
    {
        let keys: Vec<&NodeKey> = nodes.into_iter().collect();
        let members: HashSet<&NodeKey> = keys.iter().copied().collect();
        let edges: Vec<(&NodeKey, &NodeKey)> = self
            .edge_set()
            .into_iter()
            .map(|(source, target)| (source.key(), target.key()))
            .filter(|(from, to)| members.contains(from) && members.contains(to))
            .collect();

        self.subgraph(keys, edges)
    }

    pub(crate) fn inner(&self) -> &StableDiGraph<GraphNode, ()> {
        &self.graph
    }

    pub(crate) fn index_of(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.node_indices.get(key).copied()
    }

    /// Node indices sorted by bucket then object name.
    pub(crate) fn sorted_indices(&self) -> Vec<NodeIndex> {
        let mut indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        indices.sort_by(|&a, &b| self.graph[a].cmp(&self.graph[b]));
        indices
    }

    /// Distinct neighbors of `idx` in `direction`, sorted by bucket then object name.
    pub(crate) fn sorted_neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        neighbors.sort_by(|&a, &b| self.graph[a].cmp(&self.graph[b]));
        neighbors.dedup();
        neighbors
    }

    pub(crate) fn degree(&self, idx: NodeIndex, direction: Direction) -> usize {
        self.graph.edges_directed(idx, direction).count()
    }

    fn require(&self, key: &NodeKey) -> GraphResult<NodeIndex> {
        self.node_indices
            .get(key)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(key.to_string()))
    }

    fn neighbors_of(&self, key: &NodeKey, direction: Direction) -> Vec<&GraphNode> {
        let Some(&idx) = self.node_indices.get(key) else {
            return Vec::new();
        };

        self.sorted_neighbors(idx, direction)
            .into_iter()
            .map(|neighbor| &self.graph[neighbor])
            .collect()
    }

    /// Kosaraju runs on petgraph's iterative `Dfs`; `tarjan_scc` recurses
    /// once per node.
    fn cyclic_components(&self) -> Vec<Vec<NodeIndex>> {
        kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| match scc.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                _ => true,
            })
            .collect()
    }
}

/// Information about one cyclic strongly connected component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// The nodes in the component, sorted by bucket then object name
    pub nodes: Vec<GraphNode>,
}

impl CycleInfo {
    /// Returns a formatted string representation of the component.
    ///
    /// For example: "b/a -> b/b -> b/c -> b/a"
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.nodes.first() else {
            return String::new();
        };
        let mut path: Vec<String> = self.nodes.iter().map(ToString::to_string).collect();
        path.push(first.to_string());
        path.join(" -> ")
    }

    /// Returns the number of objects in the component.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the component is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

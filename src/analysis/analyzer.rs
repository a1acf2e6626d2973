//! Root/leaf discovery, path enumeration and per-root call graphs.

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, instrument};

use super::path::GraphPath;
use crate::graph::{DependencyGraph, GraphNode, NodeKey};

/// Paths grouped by their start vertex.
pub type PathsByRoot = HashMap<GraphNode, Vec<GraphPath>>;

/// Roots and leaves of a graph, sorted by bucket then object name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootsAndLeaves {
    /// Nodes nothing depends on (in-degree 0)
    pub roots: BTreeSet<GraphNode>,
    /// Nodes that depend on nothing (out-degree 0)
    pub leaves: BTreeSet<GraphNode>,
}

/// Everything a call-graph report needs, computed in one pass.
#[derive(Debug, Clone, Default)]
pub struct CallGraphAnalysis {
    /// Root-to-leaf paths (plus the folded cycle path) keyed by start vertex
    pub paths_by_root: PathsByRoot,
    /// Per-root subgraph spanning the vertices and edges of its paths
    pub call_graphs: HashMap<GraphNode, DependencyGraph>,
    /// Longest path length per root
    pub diameters: HashMap<GraphNode, usize>,
    /// Nodes without dependencies
    pub leaves: BTreeSet<GraphNode>,
    /// Every node that lies on a cycle
    pub cyclic_nodes: BTreeSet<GraphNode>,
}

impl CallGraphAnalysis {
    /// Returns true if no path was found.
    pub fn is_empty(&self) -> bool {
        self.paths_by_root.is_empty()
    }

    /// Returns the group keys in bucket/object order.
    pub fn roots(&self) -> Vec<&GraphNode> {
        let mut roots: Vec<&GraphNode> = self.paths_by_root.keys().collect();
        roots.sort();
        roots
    }
}

/// Read-only analyses over one [`DependencyGraph`].
///
/// Every traversal visits nodes and successors in bucket/object order, so
/// results do not depend on insertion or hash order.
///
/// # Example
///
/// ```
/// use catalog_callgraph::analysis::PathAnalyzer;
/// use catalog_callgraph::graph::{DependencyGraph, GraphNode, NodeKey};
///
/// let mut graph = DependencyGraph::new();
/// for name in ["a", "b", "c"] {
///     graph.add_node(GraphNode::new("bucket", name, "workflow", true).unwrap());
/// }
/// graph.add_edge(&NodeKey::new("bucket", "a"), &NodeKey::new("bucket", "b")).unwrap();
/// graph.add_edge(&NodeKey::new("bucket", "b"), &NodeKey::new("bucket", "c")).unwrap();
///
/// let paths = PathAnalyzer::new(&graph).compute_all_paths();
/// assert_eq!(paths.len(), 1);
/// assert_eq!(paths[0].to_string(), "bucket/a -> bucket/b -> bucket/c");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathAnalyzer<'g> {
    graph: &'g DependencyGraph,
}

impl<'g> PathAnalyzer<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self { graph }
    }

    /// Partitions the graph into weakly connected components.
    ///
    /// Components are ordered by their smallest node; nodes inside a
    /// component are sorted.
    pub fn connected_components(&self) -> Vec<Vec<GraphNode>> {
        self.component_indices()
            .into_iter()
            .map(|component| {
                let mut nodes: Vec<GraphNode> = component
                    .into_iter()
                    .map(|idx| self.node(idx).clone())
                    .collect();
                nodes.sort();
                nodes
            })
            .collect()
    }

    /// Classifies every node of every component as root, leaf, both or neither.
    pub fn root_and_leaf_nodes(&self) -> RootsAndLeaves {
        let mut result = RootsAndLeaves::default();

        for component in self.component_indices() {
            for idx in component {
                if self.graph.degree(idx, Direction::Incoming) == 0 {
                    result.roots.insert(self.node(idx).clone());
                }
                if self.graph.degree(idx, Direction::Outgoing) == 0 {
                    result.leaves.insert(self.node(idx).clone());
                }
            }
        }

        result
    }

    pub fn root_nodes(&self) -> BTreeSet<GraphNode> {
        self.root_and_leaf_nodes().roots
    }

    pub fn leaf_nodes(&self) -> BTreeSet<GraphNode> {
        self.root_and_leaf_nodes().leaves
    }

    /// Enumerates every simple path from a root to a leaf.
    ///
    /// Isolated nodes yield a single-node path. If the graph has cycles, one
    /// extra path walking a cycle through the smallest cyclic node is
    /// appended; all cycles of the graph are folded into that one path.
    pub fn compute_all_paths(&self) -> Vec<GraphPath> {
        let roots_and_leaves = self.root_and_leaf_nodes();
        let starts: Vec<NodeIndex> = roots_and_leaves
            .roots
            .iter()
            .filter_map(|root| self.graph.index_of(root.key()))
            .collect();

        let mut paths = self.paths_to_leaves(&starts, &roots_and_leaves.leaves);
        paths.extend(self.cycle_path());
        paths
    }

    /// Enumerates paths from every node (not only roots) to a leaf, plus the
    /// cycle path, keeping only paths with at least one edge.
    pub fn compute_call_paths(&self) -> Vec<GraphPath> {
        let leaves = self.leaf_nodes();
        let starts = self.graph.sorted_indices();

        let mut paths = self.paths_to_leaves(&starts, &leaves);
        paths.extend(self.cycle_path());
        paths.retain(|path| path.length() >= 1);
        paths
    }

    /// Walks one simple cycle through the subgraph induced by all cyclic
    /// nodes, starting and ending at the smallest of them.
    ///
    /// Returns `None` for an acyclic graph. A self-loop on the entry node
    /// gives the two-node path `[entry, entry]`.
    pub fn cycle_path(&self) -> Option<GraphPath> {
        let cyclic = self.graph.nodes_in_cycles();
        let entry = cyclic.iter().min()?.clone();
        let cyclic_graph = self.graph.induced_subgraph(&cyclic);

        let nodes = close_cycle(&cyclic_graph, &entry)?
            .iter()
            .filter_map(|key| self.graph.get_node(key).cloned())
            .collect();
        GraphPath::new(nodes).ok()
    }

    /// Runs root/leaf discovery, path enumeration, grouping and diameter
    /// computation in one go.
    #[instrument(skip(self), fields(nodes = self.graph.order(), edges = self.graph.size()))]
    pub fn analyze(&self) -> CallGraphAnalysis {
        let paths = self.compute_all_paths();
        let paths_by_root = group_by_root(paths);
        let call_graphs = call_graphs(self.graph, &paths_by_root);
        let diameters = diameter_per_root(&paths_by_root);
        let cyclic_nodes = self
            .graph
            .nodes_in_cycles()
            .iter()
            .filter_map(|key| self.graph.get_node(key).cloned())
            .collect();

        let analysis = CallGraphAnalysis {
            paths_by_root,
            call_graphs,
            diameters,
            leaves: self.leaf_nodes(),
            cyclic_nodes,
        };

        debug!(
            roots = analysis.paths_by_root.len(),
            leaves = analysis.leaves.len(),
            cyclic = analysis.cyclic_nodes.len(),
            "Analyzed dependency graph"
        );
        analysis
    }

    fn node(&self, idx: NodeIndex) -> &'g GraphNode {
        &self.graph.inner()[idx]
    }

    fn component_indices(&self) -> Vec<Vec<NodeIndex>> {
        let inner = self.graph.inner();
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut components = Vec::new();

        for start in self.graph.sorted_indices() {
            if !seen.insert(start) {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(idx) = queue.pop_front() {
                component.push(idx);
                for neighbor in inner.neighbors_undirected(idx) {
                    if seen.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
            components.push(component);
        }

        components
    }

    fn paths_to_leaves(&self, starts: &[NodeIndex], leaves: &BTreeSet<GraphNode>) -> Vec<GraphPath> {
        let mut paths = Vec::new();
        for &start in starts {
            self.walk(start, leaves, &mut paths);
        }
        paths
    }

    /// Depth-first search from `start`, emitting a path at every leaf.
    ///
    /// `frames[i]` holds the successors of `path[i]` not tried yet.
    fn walk(&self, start: NodeIndex, leaves: &BTreeSet<GraphNode>, paths: &mut Vec<GraphPath>) {
        let mut path: Vec<NodeIndex> = Vec::new();
        let mut on_path: HashSet<NodeIndex> = HashSet::new();
        let mut frames: Vec<std::vec::IntoIter<NodeIndex>> = Vec::new();
        let mut next = Some(start);

        loop {
            if let Some(idx) = next.take() {
                path.push(idx);
                on_path.insert(idx);

                let successors = if leaves.contains(self.node(idx)) {
                    let nodes = path.iter().map(|&step| self.node(step).clone()).collect();
                    paths.extend(GraphPath::new(nodes).ok());
                    Vec::new()
                } else {
                    self.graph.sorted_neighbors(idx, Direction::Outgoing)
                };
                frames.push(successors.into_iter());
            }

            let Some(frame) = frames.last_mut() else {
                break;
            };
            match frame.find(|candidate| !on_path.contains(candidate)) {
                Some(candidate) => next = Some(candidate),
                None => {
                    frames.pop();
                    if let Some(done) = path.pop() {
                        on_path.remove(&done);
                    }
                }
            }
        }
    }
}

/// Depth-first search from `entry` for an edge back to it.
///
/// Returns the walk from `entry` around to `entry` again. Every node is
/// expanded at most once.
fn close_cycle(graph: &DependencyGraph, entry: &NodeKey) -> Option<Vec<NodeKey>> {
    let successors = |key: &NodeKey| -> std::vec::IntoIter<NodeKey> {
        graph
            .get_dependencies(key)
            .into_iter()
            .map(|node| node.key().clone())
            .collect::<Vec<_>>()
            .into_iter()
    };

    let mut walk = vec![entry.clone()];
    let mut visited: HashSet<NodeKey> = HashSet::from([entry.clone()]);
    let mut frames = vec![successors(entry)];

    while let Some(frame) = frames.last_mut() {
        match frame.next() {
            Some(next) if next == *entry => {
                walk.push(next);
                return Some(walk);
            }
            Some(next) => {
                if visited.insert(next.clone()) {
                    frames.push(successors(&next));
                    walk.push(next);
                }
            }
            None => {
                frames.pop();
                walk.pop();
            }
        }
    }
    None
}

/// Partitions paths by start vertex.
pub fn group_by_root(paths: Vec<GraphPath>) -> PathsByRoot {
    let mut groups = PathsByRoot::new();
    for path in paths {
        groups
            .entry(path.start_vertex().clone())
            .or_default()
            .push(path);
    }
    groups
}

/// Builds, per root, the subgraph of `graph` spanned by its paths.
pub fn call_graphs(graph: &DependencyGraph, groups: &PathsByRoot) -> HashMap<GraphNode, DependencyGraph> {
    groups
        .iter()
        .map(|(root, paths)| {
            let nodes = paths.iter().flat_map(|path| path.nodes()).map(GraphNode::key);
            let edges = paths
                .iter()
                .flat_map(|path| path.edges())
                .map(|(from, to)| (from.key(), to.key()));
            (root.clone(), graph.subgraph(nodes, edges))
        })
        .collect()
}

/// Longest path length per root.
pub fn diameter_per_root(groups: &PathsByRoot) -> HashMap<GraphNode, usize> {
    groups
        .iter()
        .map(|(root, paths)| {
            let diameter = paths.iter().map(GraphPath::length).max().unwrap_or(0);
            (root.clone(), diameter)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> NodeKey {
        NodeKey::new("b", name)
    }

    fn graph_with(edges: &[(&str, &str)], isolated: &[&str]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            for name in [from, to] {
                graph.add_node(GraphNode::new("b", *name, "workflow", true).unwrap());
            }
            graph.add_edge(&key(from), &key(to)).unwrap();
        }
        for name in isolated {
            graph.add_node(GraphNode::new("b", *name, "workflow", true).unwrap());
        }
        graph
    }

    fn names(path: &GraphPath) -> Vec<&str> {
        path.nodes().iter().map(GraphNode::object_name).collect()
    }

    #[test]
    fn test_diamond_yields_two_paths() {
        let graph = graph_with(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")], &[]);
        let paths = PathAnalyzer::new(&graph).compute_all_paths();

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|path| path.length() == 2));
        assert!(paths.iter().all(|path| path.start_vertex().object_name() == "a"));
        assert_eq!(names(&paths[0]), vec!["a", "b", "d"]);
        assert_eq!(names(&paths[1]), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_isolated_node_yields_zero_length_path() {
        let graph = graph_with(&[], &["alone"]);
        let analyzer = PathAnalyzer::new(&graph);

        let roots_and_leaves = analyzer.root_and_leaf_nodes();
        assert_eq!(roots_and_leaves.roots.len(), 1);
        assert_eq!(roots_and_leaves.leaves.len(), 1);

        let paths = analyzer.compute_all_paths();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].length(), 0);
        assert!(analyzer.compute_call_paths().is_empty());
    }

    #[test]
    fn test_self_loop() {
        let graph = graph_with(&[("x", "x")], &[]);
        let analyzer = PathAnalyzer::new(&graph);

        let roots_and_leaves = analyzer.root_and_leaf_nodes();
        assert!(roots_and_leaves.roots.is_empty());
        assert!(roots_and_leaves.leaves.is_empty());

        let paths = analyzer.compute_all_paths();
        assert_eq!(paths.len(), 1);
        assert_eq!(names(&paths[0]), vec!["x", "x"]);
        assert_eq!(paths[0].length(), 1);
    }

    #[test]
    fn test_all_cycles_fold_into_one_path() {
        let graph = graph_with(
            &[("a", "b"), ("b", "a"), ("c", "d"), ("d", "e"), ("e", "c"), ("e", "leaf")],
            &[],
        );
        let analyzer = PathAnalyzer::new(&graph);

        let paths = analyzer.compute_all_paths();
        let cycle = analyzer.cycle_path().unwrap();

        assert_eq!(names(&cycle), vec!["a", "b", "a"]);
        assert_eq!(paths.iter().filter(|path| **path == cycle).count(), 1);
        // No roots: every path is the cycle path.
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_cycle_reached_from_root() {
        let graph = graph_with(&[("a", "b"), ("b", "c"), ("c", "b"), ("c", "d")], &[]);
        let analyzer = PathAnalyzer::new(&graph);

        let paths = analyzer.compute_all_paths();
        let rendered: Vec<Vec<&str>> = paths.iter().map(names).collect();

        assert_eq!(rendered, vec![vec!["a", "b", "c", "d"], vec!["b", "c", "b"]]);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycle_path() {
        let graph = graph_with(&[("a", "b")], &[]);
        assert!(PathAnalyzer::new(&graph).cycle_path().is_none());
    }

    #[test]
    fn test_call_paths_start_everywhere() {
        let graph = graph_with(&[("a", "b"), ("b", "c")], &["alone"]);
        let paths = PathAnalyzer::new(&graph).compute_call_paths();
        let rendered: Vec<Vec<&str>> = paths.iter().map(names).collect();

        assert_eq!(rendered, vec![vec!["a", "b", "c"], vec!["b", "c"]]);
    }

    #[test]
    fn test_connected_components() {
        let graph = graph_with(&[("a", "b"), ("c", "b"), ("d", "e")], &["f"]);
        let components = PathAnalyzer::new(&graph).connected_components();

        let rendered: Vec<Vec<&str>> = components
            .iter()
            .map(|component| component.iter().map(GraphNode::object_name).collect())
            .collect();
        assert_eq!(rendered, vec![vec!["a", "b", "c"], vec!["d", "e"], vec!["f"]]);
    }

    #[test]
    fn test_diameter_per_root() {
        let graph = graph_with(
            &[("r", "x"), ("r", "y"), ("y", "z"), ("z", "w"), ("r", "u"), ("u", "v")],
            &[],
        );
        let groups = group_by_root(PathAnalyzer::new(&graph).compute_all_paths());
        let lengths: BTreeSet<usize> = groups.values().flatten().map(GraphPath::length).collect();
        let diameters = diameter_per_root(&groups);

        assert_eq!(lengths, BTreeSet::from([1, 2, 3]));
        assert_eq!(diameters.len(), 1);
        assert_eq!(diameters.values().copied().next(), Some(3));
    }

    #[test]
    fn test_grouping_round_trip() {
        let graph = graph_with(
            &[("a", "b"), ("b", "c"), ("d", "c"), ("e", "f"), ("f", "e"), ("f", "g")],
            &["h"],
        );
        let analyzer = PathAnalyzer::new(&graph);
        let roots = analyzer.root_nodes();
        let cycle_entry = analyzer.cycle_path().map(|path| path.start_vertex().clone());

        let groups = group_by_root(analyzer.compute_all_paths());
        for group_root in groups.keys() {
            assert!(roots.contains(group_root) || Some(group_root) == cycle_entry.as_ref());
        }

        let graphs = call_graphs(&graph, &groups);
        for (root, call_graph) in &graphs {
            let on_paths: HashSet<&NodeKey> = groups[root]
                .iter()
                .flat_map(|path| path.nodes())
                .map(GraphNode::key)
                .collect();
            assert!(call_graph.node_set().all(|node| on_paths.contains(node.key())));
        }
    }

    #[test]
    fn test_call_graph_keeps_only_path_edges() {
        let graph = graph_with(&[("a", "b"), ("b", "c"), ("a", "c")], &[]);
        let groups = group_by_root(PathAnalyzer::new(&graph).compute_all_paths());
        let graphs = call_graphs(&graph, &groups);

        let call_graph = graphs.values().next().unwrap();
        assert_eq!(call_graph.order(), 3);
        assert_eq!(call_graph.size(), 3);
    }

    #[test]
    fn test_analyze() {
        let graph = graph_with(&[("a", "b"), ("b", "c"), ("x", "x")], &[]);
        let analysis = PathAnalyzer::new(&graph).analyze();

        let roots: Vec<&str> = analysis.roots().into_iter().map(GraphNode::object_name).collect();
        assert_eq!(roots, vec!["a", "x"]);
        assert_eq!(analysis.leaves.len(), 1);
        assert_eq!(analysis.cyclic_nodes.len(), 1);
        assert_eq!(analysis.call_graphs.len(), 2);

        let a = graph.get_node(&key("a")).unwrap();
        assert_eq!(analysis.diameters[a], 2);
    }

    fn chain(len: usize, closed: bool) -> DependencyGraph {
        let name = |i: usize| format!("n{:06}", i);
        let mut graph = DependencyGraph::new();
        for i in 0..len {
            graph.add_node(GraphNode::new("b", name(i), "workflow", true).unwrap());
        }
        for i in 1..len {
            graph.add_edge(&key(&name(i - 1)), &key(&name(i))).unwrap();
        }
        if closed {
            graph.add_edge(&key(&name(len - 1)), &key(&name(0))).unwrap();
        }
        graph
    }

    #[test]
    fn test_long_chain_yields_one_path() {
        let graph = chain(5_000, false);
        let paths = PathAnalyzer::new(&graph).compute_all_paths();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].length(), 4_999);
        assert_eq!(paths[0].start_vertex().object_name(), "n000000");
        assert_eq!(paths[0].end_vertex().object_name(), "n004999");
    }

    #[test]
    fn test_long_cycle_folds_into_one_path() {
        let graph = chain(8_000, true);
        let analyzer = PathAnalyzer::new(&graph);

        assert!(graph.has_cycles());
        let cycle = analyzer.cycle_path().unwrap();
        assert_eq!(cycle.length(), 8_000);
        assert_eq!(cycle.start_vertex(), cycle.end_vertex());

        let analysis = analyzer.analyze();
        assert_eq!(analysis.cyclic_nodes.len(), 8_000);
        assert_eq!(analysis.diameters[cycle.start_vertex()], 8_000);
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::new();
        let analyzer = PathAnalyzer::new(&graph);

        assert!(analyzer.connected_components().is_empty());
        assert!(analyzer.compute_all_paths().is_empty());
        assert!(analyzer.compute_call_paths().is_empty());
        assert!(analyzer.analyze().is_empty());
    }
}

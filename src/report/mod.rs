//! Deterministic ordering and bucket grouping for reports.
//!
//! Reports list catalog objects bucket by bucket, objects sorted by name
//! inside each bucket, independent of hash-map iteration order.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::analysis::{
    call_graphs, diameter_per_root, group_by_root, GraphPath, PathAnalyzer, PathsByRoot,
};
use crate::graph::{DependencyGraph, GraphNode};

/// Consecutive report entries sharing one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSection<V> {
    pub bucket_name: String,
    pub entries: Vec<(GraphNode, V)>,
}

impl<V> BucketSection<V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What one object calls and what calls it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallListing {
    /// Paths starting at the object, each ending at a leaf or closing a cycle
    pub calls: Vec<GraphPath>,
    /// Direct dependents, sorted
    pub called_by: Vec<GraphNode>,
    /// Longest call path length, 0 when the object calls nothing
    pub diameter: usize,
    /// Edges of the subgraph spanned by `calls`, sorted
    pub call_graph: Vec<(GraphNode, GraphNode)>,
}

/// Sorts entries by bucket name, then object name.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use catalog_callgraph::graph::GraphNode;
/// use catalog_callgraph::report::sort_by_bucket_then_object;
///
/// let mut sizes = HashMap::new();
/// sizes.insert(GraphNode::new("zeta", "a", "workflow", true).unwrap(), 1);
/// sizes.insert(GraphNode::new("alpha", "b", "workflow", true).unwrap(), 2);
///
/// let sorted = sort_by_bucket_then_object(sizes);
/// assert_eq!(sorted[0].0.bucket_name(), "alpha");
/// ```
pub fn sort_by_bucket_then_object<I, V>(entries: I) -> Vec<(GraphNode, V)>
where
    I: IntoIterator<Item = (GraphNode, V)>,
{
    let mut sorted: Vec<(GraphNode, V)> = entries.into_iter().collect();
    sorted.sort_by(|(a, _), (b, _)| {
        a.bucket_name()
            .cmp(b.bucket_name())
            .then_with(|| a.object_name().cmp(b.object_name()))
    });
    sorted
}

/// Splits sorted entries into one section per run of equal bucket names.
pub fn group_by_bucket<V>(sorted: Vec<(GraphNode, V)>) -> Vec<BucketSection<V>> {
    let mut sections: Vec<BucketSection<V>> = Vec::new();

    for (node, value) in sorted {
        match sections.last_mut() {
            Some(section) if section.bucket_name == node.bucket_name() => {
                section.entries.push((node, value));
            }
            _ => sections.push(BucketSection {
                bucket_name: node.bucket_name().to_string(),
                entries: vec![(node, value)],
            }),
        }
    }

    sections
}

/// Adds an empty group for every in-catalog leaf that has none yet.
///
/// Leaves never start a path of length >= 1, so without this they would be
/// missing from call listings.
pub fn with_leaf_placeholders(mut groups: PathsByRoot, leaves: &BTreeSet<GraphNode>) -> PathsByRoot {
    for leaf in leaves.iter().filter(|leaf| leaf.is_in_catalog()) {
        groups.entry(leaf.clone()).or_default();
    }
    groups
}

/// Edges of `graph`, sorted by source then target.
pub fn sorted_edges(graph: &DependencyGraph) -> Vec<(GraphNode, GraphNode)> {
    let mut edges: Vec<(GraphNode, GraphNode)> = graph
        .edge_set()
        .into_iter()
        .map(|(source, target)| (source.clone(), target.clone()))
        .collect();
    edges.sort();
    edges
}

/// Turns path groups into bucket sections, attaching each group's
/// dependents along with the diameter and call graph already computed for it.
pub fn listings(
    graph: &DependencyGraph,
    groups: PathsByRoot,
    diameters: &HashMap<GraphNode, usize>,
    call_graphs: &HashMap<GraphNode, DependencyGraph>,
) -> Vec<BucketSection<CallListing>> {
    let entries = groups.into_iter().map(|(node, calls)| {
        let listing = CallListing {
            called_by: graph
                .get_dependents(node.key())
                .into_iter()
                .cloned()
                .collect(),
            diameter: diameters.get(&node).copied().unwrap_or(0),
            call_graph: call_graphs.get(&node).map(sorted_edges).unwrap_or_default(),
            calls,
        };
        (node, listing)
    });

    group_by_bucket(sort_by_bucket_then_object(entries))
}

/// Builds the per-object calls / called-by listing of `graph`, grouped by
/// bucket.
///
/// Every object with at least one call path gets an entry, as does every
/// in-catalog leaf. Objects referenced but absent from the catalog only
/// appear inside other objects' paths.
pub fn call_listings(graph: &DependencyGraph) -> Vec<BucketSection<CallListing>> {
    let analyzer = PathAnalyzer::new(graph);
    let groups = with_leaf_placeholders(
        group_by_root(analyzer.compute_call_paths()),
        &analyzer.leaf_nodes(),
    );
    let diameters = diameter_per_root(&groups);
    let graphs = call_graphs(graph, &groups);

    listings(graph, groups, &diameters, &graphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKey;
    use std::collections::HashMap;

    fn node(bucket: &str, name: &str) -> GraphNode {
        GraphNode::new(bucket, name, "workflow", true).unwrap()
    }

    #[test]
    fn test_sort_by_bucket_then_object() {
        let mut entries = HashMap::new();
        for bucket in ["zeta", "alpha"] {
            for name in ["b", "a"] {
                entries.insert(node(bucket, name), ());
            }
        }

        let sorted: Vec<String> = sort_by_bucket_then_object(entries)
            .into_iter()
            .map(|(node, _)| node.to_string())
            .collect();

        assert_eq!(sorted, vec!["alpha/a", "alpha/b", "zeta/a", "zeta/b"]);
    }

    #[test]
    fn test_group_by_bucket() {
        let sorted = sort_by_bucket_then_object(vec![
            (node("tools", "notify"), 1),
            (node("apps", "deploy"), 2),
            (node("apps", "build"), 3),
        ]);
        let sections = group_by_bucket(sorted);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].bucket_name, "apps");
        assert_eq!(sections[0].len(), 2);
        assert_eq!(sections[0].entries[0].1, 3);
        assert_eq!(sections[1].bucket_name, "tools");
    }

    #[test]
    fn test_group_by_bucket_empty() {
        let sections: Vec<BucketSection<()>> = group_by_bucket(Vec::new());
        assert!(sections.is_empty());
    }

    #[test]
    fn test_with_leaf_placeholders_skips_missing_objects() {
        let leaves = BTreeSet::from([
            node("b", "leaf"),
            GraphNode::missing("b", "gone").unwrap(),
        ]);

        let groups = with_leaf_placeholders(PathsByRoot::new(), &leaves);

        assert_eq!(groups.len(), 1);
        assert!(groups[&node("b", "leaf")].is_empty());
    }

    #[test]
    fn test_with_leaf_placeholders_keeps_existing_group() {
        let leaf = node("b", "leaf");
        let path = GraphPath::new(vec![leaf.clone()]).unwrap();
        let groups = group_by_root(vec![path]);

        let groups = with_leaf_placeholders(groups, &BTreeSet::from([leaf.clone()]));
        assert_eq!(groups[&leaf].len(), 1);
    }

    #[test]
    fn test_call_listings() {
        let mut graph = DependencyGraph::new();
        graph.add_node(node("apps", "deploy"));
        graph.add_node(node("libs", "build"));
        graph.add_node(GraphNode::missing("libs", "gone").unwrap());
        graph
            .add_edge(&NodeKey::new("apps", "deploy"), &NodeKey::new("libs", "build"))
            .unwrap();
        graph
            .add_edge(&NodeKey::new("apps", "deploy"), &NodeKey::new("libs", "gone"))
            .unwrap();

        let sections = call_listings(&graph);

        assert_eq!(sections.len(), 2);
        let (deploy, listing) = &sections[0].entries[0];
        assert_eq!(deploy.object_name(), "deploy");
        assert_eq!(listing.calls.len(), 2);
        assert_eq!(listing.diameter, 1);
        assert_eq!(
            listing.call_graph,
            vec![
                (node("apps", "deploy"), node("libs", "build")),
                (node("apps", "deploy"), GraphNode::missing("libs", "gone").unwrap()),
            ]
        );
        assert!(listing.called_by.is_empty());

        // The missing object gets no entry of its own.
        assert_eq!(sections[1].len(), 1);
        let (build, listing) = &sections[1].entries[0];
        assert_eq!(build.object_name(), "build");
        assert!(listing.calls.is_empty());
        assert_eq!(listing.diameter, 0);
        assert!(listing.call_graph.is_empty());
        assert_eq!(listing.called_by, vec![node("apps", "deploy")]);
    }

    #[test]
    fn test_call_listings_empty_graph() {
        assert!(call_listings(&DependencyGraph::new()).is_empty());
    }
}

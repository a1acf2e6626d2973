//! Builds a [`DependencyGraph`] from catalog-object descriptors.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use super::resolver::ExistenceResolver;
use crate::config::EngineConfig;
use crate::error::{GraphError, GraphResult, ResolveError};
use crate::graph::{DependencyGraph, GraphNode, KIND_NOT_FOUND};
use crate::parser::{DependencyReference, ObjectDescriptor};

/// Which descriptors get a node of their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCreation {
    /// Only descriptors that declare at least one dependency.
    #[default]
    WithDependenciesOnly,
    /// Every descriptor, with or without dependencies.
    AllObjects,
}

/// The outcome of [`GraphBuilder::build_lenient`].
#[derive(Debug, Clone, Default)]
pub struct LenientBuild {
    /// The graph built from every well-formed reference
    pub graph: DependencyGraph,
    /// Raw references that did not split into a bucket and an object name
    pub rejected: Vec<String>,
}

/// Turns descriptors into a dependency graph.
///
/// # Example
///
/// ```
/// use catalog_callgraph::builder::{GraphBuilder, InMemoryCatalog};
/// use catalog_callgraph::config::EngineConfig;
/// use catalog_callgraph::graph::NodeKey;
/// use catalog_callgraph::parser::{Metadata, ObjectDescriptor};
///
/// let objects = vec![
///     ObjectDescriptor::new("basic-examples", "Deploy", "workflow/standard")
///         .with_metadata(Metadata::depends_on("basic-examples/Build")),
///     ObjectDescriptor::new("basic-examples", "Build", "workflow/standard"),
/// ];
/// let catalog = InMemoryCatalog::from_descriptors(&objects);
///
/// let graph = GraphBuilder::new(EngineConfig::default())
///     .build(&objects, &catalog)
///     .unwrap();
///
/// assert_eq!(graph.order(), 2);
/// assert!(graph.contains_edge(
///     &NodeKey::new("basic-examples", "Deploy"),
///     &NodeKey::new("basic-examples", "Build"),
/// ));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: EngineConfig,
}

impl GraphBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds a graph, failing on the first malformed reference.
    ///
    /// All references of a descriptor are parsed before any of them is
    /// linked, so a malformed reference never leaves its descriptor half
    /// connected.
    ///
    /// # Errors
    ///
    /// - [`GraphError::MalformedReference`] for a reference without exactly
    ///   one bucket and one object name
    /// - [`GraphError::ResolutionFailed`] when the resolver fails
    /// - [`GraphError::InvalidArgument`] for a descriptor with an empty name
    #[instrument(skip_all, fields(objects = objects.len()))]
    pub fn build<R: ExistenceResolver>(
        &self,
        objects: &[ObjectDescriptor],
        resolver: &R,
    ) -> GraphResult<DependencyGraph> {
        self.build_with(objects, resolver, false)
            .map(|build| build.graph)
    }

    /// Builds a graph, skipping malformed references.
    ///
    /// Well-formed references of the same descriptor are still linked.
    /// Resolver failures abort the build as in [`GraphBuilder::build`].
    #[instrument(skip_all, fields(objects = objects.len()))]
    pub fn build_lenient<R: ExistenceResolver>(
        &self,
        objects: &[ObjectDescriptor],
        resolver: &R,
    ) -> GraphResult<LenientBuild> {
        self.build_with(objects, resolver, true)
    }

    fn build_with<R: ExistenceResolver>(
        &self,
        objects: &[ObjectDescriptor],
        resolver: &R,
        lenient: bool,
    ) -> GraphResult<LenientBuild> {
        let label = &self.config.depends_on_label;
        let mut result = LenientBuild {
            graph: DependencyGraph::with_capacity(objects.len(), objects.len()),
            rejected: Vec::new(),
        };

        for object in objects {
            if self.config.node_creation == NodeCreation::WithDependenciesOnly
                && !object.has_dependencies(label)
            {
                continue;
            }

            let raw_references = object.dependency_references(label);

            let mut references = Vec::with_capacity(raw_references.len());
            for raw in raw_references {
                match DependencyReference::parse(raw, &self.config.separator) {
                    Ok(reference) => references.push(reference),
                    Err(err) if lenient => {
                        warn!(object = %object, error = %err, "Skipping malformed dependency reference");
                        result.rejected.push(raw.to_string());
                    }
                    Err(err) => return Err(err),
                }
            }

            self.link_object(&mut result.graph, object, &references, resolver)?;
        }

        debug!(
            nodes = result.graph.order(),
            edges = result.graph.size(),
            rejected = result.rejected.len(),
            "Built dependency graph"
        );
        Ok(result)
    }

    fn link_object<R: ExistenceResolver>(
        &self,
        graph: &mut DependencyGraph,
        object: &ObjectDescriptor,
        references: &[DependencyReference],
        resolver: &R,
    ) -> GraphResult<()> {
        let source = GraphNode::new(&object.bucket_name, &object.name, &object.kind, true)?;
        let source_key = source.key().clone();
        graph.add_node(source);

        for reference in references {
            let target = resolve(reference, resolver)?;
            let target_key = target.key().clone();
            graph.add_node(target);

            if graph.add_edge(&source_key, &target_key)? {
                trace!(from = %source_key, to = %target_key, "Added dependency edge");
            }
        }
        Ok(())
    }
}

/// Looks up a referenced object and builds its node.
fn resolve<R: ExistenceResolver>(
    reference: &DependencyReference,
    resolver: &R,
) -> GraphResult<GraphNode> {
    let failed = |source: ResolveError| {
        warn!(reference = %reference, "Resolver failed");
        GraphError::ResolutionFailed {
            reference: reference.to_string(),
            source,
        }
    };

    let exists = resolver
        .exists(&reference.bucket_name, &reference.object_name)
        .map_err(failed)?;
    let kind = if exists {
        resolver
            .kind_of(&reference.bucket_name, &reference.object_name)
            .map_err(failed)?
    } else {
        KIND_NOT_FOUND.to_string()
    };

    GraphNode::new(
        &reference.bucket_name,
        &reference.object_name,
        kind,
        exists,
    )
}

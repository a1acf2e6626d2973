//! Error types for graph construction and analysis.

/// Boxed error returned by an [`ExistenceResolver`](crate::builder::ExistenceResolver).
pub type ResolveError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building or mutating a dependency graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A node could not be constructed from the given values.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An edge referenced a node that is not part of the graph.
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// The resolver failed while looking up a referenced catalog object.
    #[error("Failed to resolve '{reference}': {source}")]
    ResolutionFailed {
        /// The `bucket/object` pair being resolved
        reference: String,
        /// The underlying resolver error
        #[source]
        source: ResolveError,
    },

    /// A dependency reference did not split into a bucket and an object name.
    #[error("Malformed dependency reference '{reference}' (expected <bucket>{separator}<object>)")]
    MalformedReference {
        /// The raw reference string
        reference: String,
        /// The separator it was split on
        separator: String,
    },
}

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

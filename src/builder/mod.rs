//! Graph construction from catalog-object descriptors.
//!
//! [`GraphBuilder`] reads the depends-on references of each descriptor and
//! asks an [`ExistenceResolver`] whether every referenced object exists.
//! Referenced objects that are missing from the catalog still become nodes,
//! with kind `"N/A"`.

mod graph_builder;
mod resolver;

pub use graph_builder::{GraphBuilder, LenientBuild, NodeCreation};
pub use resolver::{CachingResolver, ExistenceResolver, InMemoryCatalog};

//! catalog-callgraph - dependency-graph engine for catalog objects
//!
//! This crate builds a directed graph from the depends-on references that
//! catalog objects declare in their metadata, then derives call graphs from
//! it: roots and leaves, root-to-leaf paths, folded cycles and per-root
//! diameters, rendered as JSON, CSV or Markdown reports.

pub mod analysis;
pub mod builder;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod parser;
pub mod report;

pub use error::{GraphError, GraphResult};

//! Parser module for catalog-object descriptors.
//!
//! This module reads catalog dumps (JSON arrays of object descriptors) and
//! splits the dependency references declared in their metadata.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use catalog_callgraph::parser::{catalog_json, DEPENDS_ON_LABEL};
//!
//! let objects = catalog_json::parse_file(Path::new("catalog.json")).unwrap();
//! catalog_json::validate(&objects).unwrap();
//!
//! let with_dependencies = objects
//!     .iter()
//!     .filter(|object| object.has_dependencies(DEPENDS_ON_LABEL))
//!     .count();
//! println!("{} objects declare dependencies", with_dependencies);
//! ```

pub mod catalog_json;
pub mod reference;
pub mod types;

pub use catalog_json::{parse_file, parse_str, select_objects, validate, ParseError, ParseResult};
pub use reference::{DependencyReference, DEFAULT_SEPARATOR};
pub use types::{Metadata, ObjectDescriptor, DEPENDS_ON_LABEL};

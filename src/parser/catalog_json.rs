//! Parser for JSON catalog dumps.
//!
//! A dump is either a bare array of object descriptors or an object with an
//! `objects` array, as produced by the catalog's listing endpoints.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::types::ObjectDescriptor;

/// Errors that can occur during catalog dump parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A descriptor is missing required fields.
    #[error("Invalid catalog object: {0}")]
    InvalidObject(String),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDump {
    Objects(Vec<ObjectDescriptor>),
    Wrapped { objects: Vec<ObjectDescriptor> },
}

/// Parses a catalog dump from a file path.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use catalog_callgraph::parser::catalog_json::parse_file;
///
/// let objects = parse_file(Path::new("catalog.json")).unwrap();
/// println!("{} catalog objects", objects.len());
/// ```
pub fn parse_file(path: &Path) -> ParseResult<Vec<ObjectDescriptor>> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a catalog dump from a string.
///
/// # Example
///
/// ```
/// use catalog_callgraph::parser::catalog_json::parse_str;
///
/// let json = r#"[{"bucket_name": "b", "name": "wf", "kind": "workflow"}]"#;
/// let objects = parse_str(json).unwrap();
/// assert_eq!(objects[0].name, "wf");
/// ```
pub fn parse_str(content: &str) -> ParseResult<Vec<ObjectDescriptor>> {
    let dump: CatalogDump = serde_json::from_str(content)?;
    Ok(match dump {
        CatalogDump::Objects(objects) => objects,
        CatalogDump::Wrapped { objects } => objects,
    })
}

/// Validates parsed descriptors.
///
/// Every descriptor needs a bucket name and an object name.
pub fn validate(objects: &[ObjectDescriptor]) -> ParseResult<()> {
    for (position, object) in objects.iter().enumerate() {
        if object.bucket_name.trim().is_empty() {
            return Err(ParseError::InvalidObject(format!(
                "object #{} ('{}') has no bucket name",
                position, object.name
            )));
        }
        if object.name.trim().is_empty() {
            return Err(ParseError::InvalidObject(format!(
                "object #{} in bucket '{}' has no name",
                position, object.bucket_name
            )));
        }
    }
    Ok(())
}

/// Keeps the objects of `bucket_name` whose names are listed in `names`.
///
/// An empty `names` slice keeps the whole bucket.
pub fn select_objects(
    objects: &[ObjectDescriptor],
    bucket_name: &str,
    names: &[String],
) -> Vec<ObjectDescriptor> {
    objects
        .iter()
        .filter(|object| object.bucket_name == bucket_name)
        .filter(|object| names.is_empty() || names.iter().any(|name| *name == object.name))
        .cloned()
        .collect()
}

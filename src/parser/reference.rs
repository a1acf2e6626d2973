//! Dependency-reference strings.
//!
//! A reference names another catalog object as `<bucket><separator><object>`.

use std::fmt;

use crate::error::{GraphError, GraphResult};

/// Default separator between bucket and object names.
pub const DEFAULT_SEPARATOR: &str = "/";

/// A parsed dependency reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyReference {
    pub bucket_name: String,
    pub object_name: String,
    /// The separator the reference was split on
    pub separator: String,
}

impl DependencyReference {
    /// Splits `raw` on `separator` into a bucket and an object name.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MalformedReference`] unless `raw` splits into
    /// exactly two non-empty parts.
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_callgraph::parser::DependencyReference;
    ///
    /// let reference = DependencyReference::parse("basic-examples/Deploy", "/").unwrap();
    /// assert_eq!(reference.bucket_name, "basic-examples");
    /// assert_eq!(reference.object_name, "Deploy");
    ///
    /// assert!(DependencyReference::parse("Deploy", "/").is_err());
    /// ```
    pub fn parse(raw: &str, separator: &str) -> GraphResult<Self> {
        let malformed = || GraphError::MalformedReference {
            reference: raw.to_string(),
            separator: separator.to_string(),
        };

        if separator.is_empty() {
            return Err(malformed());
        }

        let parts: Vec<&str> = raw.split(separator).collect();
        match parts.as_slice() {
            [bucket, object] if !bucket.trim().is_empty() && !object.trim().is_empty() => {
                Ok(Self {
                    bucket_name: (*bucket).to_string(),
                    object_name: (*object).to_string(),
                    separator: separator.to_string(),
                })
            }
            _ => Err(malformed()),
        }
    }

    /// Joins bucket and object names with `separator`.
    pub fn join(bucket_name: &str, object_name: &str, separator: &str) -> String {
        format!("{}{}{}", bucket_name, separator, object_name)
    }
}

impl fmt::Display for DependencyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.bucket_name, self.separator, self.object_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let reference = DependencyReference::parse("bucket1/workflow1", DEFAULT_SEPARATOR).unwrap();
        assert_eq!(reference.bucket_name, "bucket1");
        assert_eq!(reference.object_name, "workflow1");
    }

    #[test]
    fn test_parse_multi_character_separator() {
        let reference = DependencyReference::parse("bucket1::workflow1", "::").unwrap();
        assert_eq!(reference.bucket_name, "bucket1");
        assert_eq!(reference.object_name, "workflow1");
    }

    #[test]
    fn test_parse_rejects_wrong_part_count() {
        for raw in ["workflow1", "a/b/c", ""] {
            let err = DependencyReference::parse(raw, DEFAULT_SEPARATOR).unwrap_err();
            assert!(matches!(err, GraphError::MalformedReference { .. }), "{raw}");
        }
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(DependencyReference::parse("/workflow1", DEFAULT_SEPARATOR).is_err());
        assert!(DependencyReference::parse("bucket1/", DEFAULT_SEPARATOR).is_err());
    }

    #[test]
    fn test_parse_rejects_empty_separator() {
        assert!(DependencyReference::parse("bucket1/workflow1", "").is_err());
    }

    #[test]
    fn test_join() {
        assert_eq!(DependencyReference::join("b", "o", "/"), "b/o");
        assert_eq!(DependencyReference::join("b", "o", "::"), "b::o");
    }

    #[test]
    fn test_display() {
        let reference = DependencyReference::parse("b::o", "::").unwrap();
        assert_eq!(reference.to_string(), "b::o");
        assert_eq!(
            DependencyReference::parse("b/o", DEFAULT_SEPARATOR).unwrap().to_string(),
            "b/o"
        );
    }
}

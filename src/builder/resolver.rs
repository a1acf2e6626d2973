//! Catalog lookups used while building a graph.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::ResolveError;
use crate::graph::{NodeKey, KIND_NOT_FOUND};
use crate::parser::ObjectDescriptor;

/// Answers whether a referenced catalog object exists and what kind it is.
///
/// Implementations may block (for example on a catalog lookup); the builder
/// calls them once per reference, before the reference's edge is added.
pub trait ExistenceResolver {
    /// Returns true if `bucket_name/object_name` exists in the catalog.
    fn exists(&self, bucket_name: &str, object_name: &str) -> Result<bool, ResolveError>;

    /// Returns the kind of an existing catalog object.
    fn kind_of(&self, bucket_name: &str, object_name: &str) -> Result<String, ResolveError>;
}

impl<R: ExistenceResolver + ?Sized> ExistenceResolver for &R {
    fn exists(&self, bucket_name: &str, object_name: &str) -> Result<bool, ResolveError> {
        (**self).exists(bucket_name, object_name)
    }

    fn kind_of(&self, bucket_name: &str, object_name: &str) -> Result<String, ResolveError> {
        (**self).kind_of(bucket_name, object_name)
    }
}

/// A resolver backed by an in-memory table of catalog objects.
///
/// # Example
///
/// ```
/// use catalog_callgraph::builder::{ExistenceResolver, InMemoryCatalog};
/// use catalog_callgraph::parser::ObjectDescriptor;
///
/// let catalog = InMemoryCatalog::from_descriptors(&[
///     ObjectDescriptor::new("basic-examples", "Deploy", "workflow/standard"),
/// ]);
///
/// assert!(catalog.exists("basic-examples", "Deploy").unwrap());
/// assert!(!catalog.exists("basic-examples", "Missing").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    kinds: HashMap<NodeKey, String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every descriptor by bucket and object name.
    pub fn from_descriptors(objects: &[ObjectDescriptor]) -> Self {
        let mut catalog = Self::new();
        for object in objects {
            catalog.insert(&object.bucket_name, &object.name, &object.kind);
        }
        catalog
    }

    /// Registers an object. An already registered object keeps its kind.
    pub fn insert(&mut self, bucket_name: &str, object_name: &str, kind: &str) {
        self.kinds
            .entry(NodeKey::new(bucket_name, object_name))
            .or_insert_with(|| kind.to_string());
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl ExistenceResolver for InMemoryCatalog {
    fn exists(&self, bucket_name: &str, object_name: &str) -> Result<bool, ResolveError> {
        Ok(self
            .kinds
            .contains_key(&NodeKey::new(bucket_name, object_name)))
    }

    fn kind_of(&self, bucket_name: &str, object_name: &str) -> Result<String, ResolveError> {
        Ok(self
            .kinds
            .get(&NodeKey::new(bucket_name, object_name))
            .cloned()
            .unwrap_or_else(|| KIND_NOT_FOUND.to_string()))
    }
}

/// Memoizes another resolver's answers per bucket and object name.
///
/// Meant to live for a single build. Errors are not cached, so a failed
/// lookup is retried the next time the same object is referenced.
#[derive(Debug)]
pub struct CachingResolver<R> {
    inner: R,
    existence: RefCell<HashMap<NodeKey, bool>>,
    kinds: RefCell<HashMap<NodeKey, String>>,
}

impl<R: ExistenceResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            existence: RefCell::new(HashMap::new()),
            kinds: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the wrapped resolver.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: ExistenceResolver> ExistenceResolver for CachingResolver<R> {
    fn exists(&self, bucket_name: &str, object_name: &str) -> Result<bool, ResolveError> {
        let key = NodeKey::new(bucket_name, object_name);
        if let Some(&known) = self.existence.borrow().get(&key) {
            return Ok(known);
        }

        let exists = self.inner.exists(bucket_name, object_name)?;
        self.existence.borrow_mut().insert(key, exists);
        Ok(exists)
    }

    fn kind_of(&self, bucket_name: &str, object_name: &str) -> Result<String, ResolveError> {
        let key = NodeKey::new(bucket_name, object_name);
        if let Some(kind) = self.kinds.borrow().get(&key) {
            return Ok(kind.clone());
        }

        let kind = self.inner.kind_of(bucket_name, object_name)?;
        self.kinds.borrow_mut().insert(key, kind.clone());
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Counts calls and fails for the bucket named "broken".
    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl ExistenceResolver for CountingResolver {
        fn exists(&self, bucket_name: &str, _object_name: &str) -> Result<bool, ResolveError> {
            self.calls.set(self.calls.get() + 1);
            if bucket_name == "broken" {
                return Err("catalog unavailable".into());
            }
            Ok(true)
        }

        fn kind_of(&self, _bucket_name: &str, _object_name: &str) -> Result<String, ResolveError> {
            self.calls.set(self.calls.get() + 1);
            Ok("workflow".to_string())
        }
    }

    #[test]
    fn test_in_memory_catalog() {
        let catalog = InMemoryCatalog::from_descriptors(&[
            ObjectDescriptor::new("b", "wf", "workflow/standard"),
            ObjectDescriptor::new("b", "wf", "script"),
            ObjectDescriptor::new("tools", "notify", "script"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert!(catalog.exists("tools", "notify").unwrap());
        assert_eq!(catalog.kind_of("b", "wf").unwrap(), "workflow/standard");
        assert_eq!(catalog.kind_of("b", "nope").unwrap(), KIND_NOT_FOUND);
    }

    #[test]
    fn test_caching_resolver_memoizes() {
        let resolver = CachingResolver::new(CountingResolver {
            calls: Cell::new(0),
        });

        for _ in 0..3 {
            assert!(resolver.exists("b", "wf").unwrap());
            assert_eq!(resolver.kind_of("b", "wf").unwrap(), "workflow");
        }

        assert_eq!(resolver.into_inner().calls.get(), 2);
    }

    #[test]
    fn test_caching_resolver_does_not_cache_errors() {
        let resolver = CachingResolver::new(CountingResolver {
            calls: Cell::new(0),
        });

        assert!(resolver.exists("broken", "wf").is_err());
        assert!(resolver.exists("broken", "wf").is_err());
        assert_eq!(resolver.into_inner().calls.get(), 2);
    }

    #[test]
    fn test_resolver_by_reference() {
        let catalog = InMemoryCatalog::from_descriptors(&[ObjectDescriptor::new("b", "o", "k")]);
        fn lookup<R: ExistenceResolver>(resolver: R) -> bool {
            resolver.exists("b", "o").unwrap()
        }
        assert!(lookup(&catalog));
    }
}

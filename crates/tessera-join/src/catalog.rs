use std::collections::HashMap;

use bson::RawDocumentBuf;

/// Source of foreign collections for a `$lookup`.
pub trait Catalog {
    /// Documents of the named collection, in scan order. `None` if the
    /// collection does not exist.
    fn collection(&self, name: &str) -> Option<&[RawDocumentBuf]>;
}

/// A catalog holding whole collections in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    collections: HashMap<String, Vec<RawDocumentBuf>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a collection.
    pub fn insert(&mut self, name: impl Into<String>, docs: Vec<RawDocumentBuf>) {
        self.collections.insert(name.into(), docs);
    }
}

impl Catalog for MemoryCatalog {
    fn collection(&self, name: &str) -> Option<&[RawDocumentBuf]> {
        self.collections.get(name).map(Vec::as_slice)
    }
}

use std::collections::{BTreeSet, HashMap};

use bson::RawDocumentBuf;
use tessera_query::FieldPath;

use crate::error::JoinError;
use crate::key::JoinKey;
use crate::resolve::resolve_foreign;
use crate::set::LogicalValueSet;

/// Join-key index over one foreign collection.
///
/// Every key in a foreign document's value set points back to that
/// document's position. Built once per lookup, probed once per local
/// document.
#[derive(Debug, Clone, Default)]
pub struct ForeignIndex {
    entries: HashMap<JoinKey, Vec<usize>>,
    docs: usize,
}

impl ForeignIndex {
    pub fn build(docs: &[RawDocumentBuf], path: &FieldPath) -> Result<Self, JoinError> {
        let mut entries: HashMap<JoinKey, Vec<usize>> = HashMap::new();
        for (pos, doc) in docs.iter().enumerate() {
            let set = resolve_foreign(doc, path)?;
            // Keys within one set are distinct, so each position lands at
            // most once per entry.
            for key in set.keys() {
                entries.entry(key.clone()).or_default().push(pos);
            }
        }
        Ok(Self {
            entries,
            docs: docs.len(),
        })
    }

    /// Positions of the foreign documents matching `local`, ascending.
    pub fn probe(&self, local: &LogicalValueSet<'_>) -> Vec<usize> {
        let mut hits = BTreeSet::new();
        for key in local.keys() {
            if let Some(positions) = self.entries.get(key) {
                hits.extend(positions.iter().copied());
            }
        }
        hits.into_iter().collect()
    }

    /// Number of documents indexed.
    pub fn len(&self) -> usize {
        self.docs
    }

    pub fn is_empty(&self) -> bool {
        self.docs == 0
    }

    /// Number of distinct join keys.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

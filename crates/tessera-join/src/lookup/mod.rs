mod index;
mod output;

use bson::{Bson, Document, RawDocument, RawDocumentBuf};
use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::config::{JoinConfig, JoinStrategy};
use crate::error::JoinError;
use crate::matcher::matches;
use crate::resolve::{resolve_foreign, resolve_local};
use crate::set::LogicalValueSet;
use tessera_query::LookupSpec;

pub use index::ForeignIndex;
use output::set_path;

/// An executable equality `$lookup` stage.
#[derive(Debug, Clone)]
pub struct Lookup {
    spec: LookupSpec,
    config: JoinConfig,
}

impl Lookup {
    pub fn new(spec: LookupSpec, config: JoinConfig) -> Self {
        Self { spec, config }
    }

    /// Build from a stage document: `{ "$lookup": { ... } }`.
    pub fn from_stage(stage: &RawDocument, config: JoinConfig) -> Result<Self, JoinError> {
        Ok(Self::new(LookupSpec::parse_stage(stage)?, config))
    }

    pub fn spec(&self) -> &LookupSpec {
        &self.spec
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// For each local document, the positions of its matching foreign
    /// documents in ascending order.
    ///
    /// Every local document is resolved before anything is returned, so a
    /// local `undefined` fails the whole call.
    pub fn match_positions(
        &self,
        local: &[RawDocumentBuf],
        foreign: &[RawDocumentBuf],
    ) -> Result<Vec<Vec<usize>>, JoinError> {
        match self.config.strategy {
            JoinStrategy::NestedLoop => {
                let foreign_sets = foreign
                    .iter()
                    .map(|doc| resolve_foreign(doc, &self.spec.foreign_field))
                    .collect::<Result<Vec<_>, _>>()?;
                local
                    .iter()
                    .map(|doc| {
                        let set = resolve_local(doc, &self.spec.local_field)?;
                        Ok(scan(&set, &foreign_sets))
                    })
                    .collect()
            }
            JoinStrategy::Hash => {
                let index = ForeignIndex::build(foreign, &self.spec.foreign_field)?;
                debug!(
                    docs = index.len(),
                    keys = index.key_count(),
                    "built foreign index"
                );
                local
                    .iter()
                    .map(|doc| {
                        let set = resolve_local(doc, &self.spec.local_field)?;
                        Ok(index.probe(&set))
                    })
                    .collect()
            }
        }
    }

    /// Run the stage over `local`, pulling the foreign collection from
    /// `catalog`. A collection the catalog does not know is empty.
    ///
    /// Output is one document per local document, in input order, with the
    /// matching foreign documents written at `as` in foreign scan order.
    pub fn execute<C: Catalog + ?Sized>(
        &self,
        local: &[RawDocumentBuf],
        catalog: &C,
    ) -> Result<Vec<Document>, JoinError> {
        let foreign = catalog.collection(&self.spec.from).unwrap_or_default();
        debug!(
            from = %self.spec.from,
            local_field = %self.spec.local_field,
            foreign_field = %self.spec.foreign_field,
            strategy = ?self.config.strategy,
            local = local.len(),
            foreign = foreign.len(),
            "executing lookup"
        );

        let positions = self.match_positions(local, foreign)?;

        // Each foreign document is converted at most once.
        let mut owned: Vec<Option<Bson>> = vec![None; foreign.len()];
        let mut out = Vec::with_capacity(local.len());
        let mut total = 0;
        for (i, (doc, hits)) in local.iter().zip(positions).enumerate() {
            let mut joined = Vec::with_capacity(hits.len());
            for pos in hits {
                let value = match &owned[pos] {
                    Some(value) => value.clone(),
                    None => {
                        let value = Bson::Document(to_document(&foreign[pos])?);
                        owned[pos] = Some(value.clone());
                        value
                    }
                };
                joined.push(value);
            }
            trace!(doc = i, matched = joined.len(), "joined local document");
            total += joined.len();

            let mut result = to_document(doc)?;
            set_path(&mut result, &self.spec.as_field, Bson::Array(joined));
            out.push(result);
        }

        debug!(docs = out.len(), matched = total, "lookup complete");
        Ok(out)
    }
}

fn scan(local: &LogicalValueSet<'_>, foreign: &[LogicalValueSet<'_>]) -> Vec<usize> {
    foreign
        .iter()
        .enumerate()
        .filter(|(_, set)| matches(local, set))
        .map(|(pos, _)| pos)
        .collect()
}

fn to_document(raw: &RawDocument) -> Result<Document, JoinError> {
    Ok(Document::try_from(raw)?)
}

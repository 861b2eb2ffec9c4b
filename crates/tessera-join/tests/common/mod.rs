#![allow(dead_code)]

use bson::{Bson, Decimal128, Document, RawDocumentBuf, rawdoc};
use tessera_join::{JoinConfig, JoinError, JoinStrategy, Lookup, LookupSpec, MemoryCatalog};

pub const FOREIGN: &str = "foreign";

pub fn spec(local_field: &str, foreign_field: &str) -> LookupSpec {
    LookupSpec::parse(&rawdoc! {
        "from": FOREIGN,
        "localField": local_field,
        "foreignField": foreign_field,
        "as": "matched",
    })
    .unwrap()
}

pub fn catalog(foreign: Vec<RawDocumentBuf>) -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.insert(FOREIGN, foreign);
    catalog
}

/// Run the lookup under both strategies and check they agree.
pub fn run(
    local: &[RawDocumentBuf],
    local_field: &str,
    foreign: Vec<RawDocumentBuf>,
    foreign_field: &str,
) -> Result<Vec<Document>, JoinError> {
    let catalog = catalog(foreign);
    let execute = |strategy| {
        Lookup::new(spec(local_field, foreign_field), JoinConfig { strategy })
            .execute(local, &catalog)
    };
    match (execute(JoinStrategy::NestedLoop), execute(JoinStrategy::Hash)) {
        (Ok(nested), Ok(hashed)) => {
            // Compared as bytes: `Bson::Double(NaN)` is not equal to itself.
            assert_eq!(encode(&nested), encode(&hashed), "strategies disagree");
            Ok(nested)
        }
        (Err(e), Err(_)) => Err(e),
        (nested, hashed) => panic!("strategies disagree: {nested:?} vs {hashed:?}"),
    }
}

pub fn encode(docs: &[Document]) -> Vec<Vec<u8>> {
    docs.iter()
        .map(|doc| RawDocumentBuf::try_from(doc).unwrap().into_bytes())
        .collect()
}

/// One foreign document: `_id`s of the local documents that matched it.
pub fn single_foreign(
    local: Vec<RawDocumentBuf>,
    local_field: &str,
    foreign: RawDocumentBuf,
    foreign_field: &str,
) -> Vec<i32> {
    let out = run(&local, local_field, vec![foreign], foreign_field).unwrap();
    let mut ids: Vec<i32> = out
        .iter()
        .filter(|doc| !doc.get_array("matched").unwrap().is_empty())
        .map(|doc| doc.get_i32("_id").unwrap())
        .collect();
    ids.sort_unstable();
    ids
}

/// One local document: `_id`s of the foreign documents joined into it.
pub fn single_local(
    local: RawDocumentBuf,
    local_field: &str,
    foreign: Vec<RawDocumentBuf>,
    foreign_field: &str,
) -> Vec<i32> {
    let out = run(&[local], local_field, foreign, foreign_field).unwrap();
    assert_eq!(out.len(), 1);
    let mut ids: Vec<i32> = out[0]
        .get_array("matched")
        .unwrap()
        .iter()
        .map(|m| match m {
            Bson::Document(doc) => doc.get_i32("_id").unwrap(),
            other => panic!("expected a document, got {other:?}"),
        })
        .collect();
    ids.sort_unstable();
    ids
}

pub fn decimal_nan() -> Decimal128 {
    let mut bytes = [0u8; 16];
    bytes[15] = 0x7C;
    Decimal128::from_bytes(bytes)
}

mod catalog;
mod config;
mod decimal;
mod error;
mod key;
mod lookup;
mod matcher;
mod member;
mod resolve;
mod set;

pub use bson::{Document, RawDocument, RawDocumentBuf};
pub use catalog::{Catalog, MemoryCatalog};
pub use config::{JoinConfig, JoinStrategy};
pub use error::JoinError;
pub use key::JoinKey;
pub use lookup::{ForeignIndex, Lookup};
pub use matcher::matches;
pub use member::Member;
pub use resolve::{Side, resolve, resolve_foreign, resolve_local};
pub use set::LogicalValueSet;
pub use tessera_query::{FieldPath, LookupParseError, LookupSpec, PathComponent, PathParseError};

mod lookup;
mod path;

pub use lookup::{LookupParseError, LookupSpec};
pub use path::{FieldPath, PathComponent, PathParseError};

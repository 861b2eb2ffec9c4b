use std::fmt;

use tessera_query::LookupParseError;

#[derive(Debug)]
pub enum JoinError {
    /// The join cannot run as asked, e.g. the local side resolved to
    /// `undefined`. Aborts the whole operation.
    Validation(String),
    Spec(LookupParseError),
    Bson(bson::error::Error),
}

impl JoinError {
    pub(crate) fn undefined_comparison(path: &str) -> Self {
        Self::Validation(format!(
            "cannot compare to undefined: local field '{path}' resolved to undefined"
        ))
    }
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
            Self::Spec(e) => write!(f, "invalid lookup: {e}"),
            Self::Bson(e) => write!(f, "bson: {e}"),
        }
    }
}

impl std::error::Error for JoinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(_) => None,
            Self::Spec(e) => Some(e),
            Self::Bson(e) => Some(e),
        }
    }
}

impl From<LookupParseError> for JoinError {
    fn from(e: LookupParseError) -> Self {
        Self::Spec(e)
    }
}

impl From<bson::error::Error> for JoinError {
    fn from(e: bson::error::Error) -> Self {
        Self::Bson(e)
    }
}

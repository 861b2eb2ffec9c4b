use std::path::PathBuf;

use tessera_join::{JoinError, LookupParseError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path}: expected a JSON document, got {found}")]
    NotADocument { path: PathBuf, found: String },

    #[error("bson error: {0}")]
    Bson(#[from] bson::error::Error),

    #[error("invalid lookup: {0}")]
    Spec(#[from] LookupParseError),

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),
}

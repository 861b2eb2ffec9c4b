use std::io::Read;
use std::path::Path;

use bson::{Bson, Document, RawDocumentBuf};
use serde::de::DeserializeOwned;
use tessera_join::JoinConfig;

use crate::error::CliError;

/// Parse documents from JSON text: either one array of documents or a
/// stream of documents separated by whitespace (JSON lines).
pub fn parse_documents(text: &str, path: &Path) -> Result<Vec<RawDocumentBuf>, CliError> {
    let json_err = |source| CliError::Json {
        path: path.to_path_buf(),
        source,
    };

    let values: Vec<serde_json::Value> = if text.trim_start().starts_with('[') {
        serde_json::from_str(text).map_err(json_err)?
    } else {
        serde_json::Deserializer::from_str(text)
            .into_iter::<serde_json::Value>()
            .collect::<Result<_, _>>()
            .map_err(json_err)?
    };

    values
        .into_iter()
        .map(|value| to_raw_document(value, path))
        .collect()
}

/// Convert one JSON value, read as canonical or relaxed extended JSON.
fn to_raw_document(value: serde_json::Value, path: &Path) -> Result<RawDocumentBuf, CliError> {
    match value {
        serde_json::Value::Object(map) => {
            let doc = Document::try_from(map)?;
            Ok(RawDocumentBuf::try_from(&doc)?)
        }
        other => Err(CliError::NotADocument {
            path: path.to_path_buf(),
            found: other.to_string(),
        }),
    }
}

/// Render a document as one line of relaxed extended JSON.
pub fn to_extjson(doc: Document, pretty: bool) -> Result<String, CliError> {
    let value = Bson::Document(doc).into_relaxed_extjson();
    if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .map_err(CliError::Serialize)
}

/// Read documents from `path`, or from stdin when `path` is `None`.
pub fn read_documents(path: Option<&Path>) -> Result<Vec<RawDocumentBuf>, CliError> {
    match path {
        Some(path) => parse_documents(&read_to_string(path)?, path),
        None => {
            let stdin = Path::new("<stdin>");
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::Read {
                    path: stdin.to_path_buf(),
                    source,
                })?;
            parse_documents(&text, stdin)
        }
    }
}

/// Read a single JSON document, such as a `$lookup` stage.
pub fn read_document(path: &Path) -> Result<RawDocumentBuf, CliError> {
    let value: serde_json::Value = read_json(path)?;
    to_raw_document(value, path)
}

pub fn read_config(path: &Path) -> Result<JoinConfig, CliError> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    serde_json::from_str(&read_to_string(path)?).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

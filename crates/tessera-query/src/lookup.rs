use std::fmt;

use bson::RawDocument;
use bson::raw::RawBsonRef;
use serde::{Deserialize, Serialize};

use crate::path::{FieldPath, PathParseError};

/// Parse error for `$lookup` stage documents.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupParseError {
    Malformed(String),
    NotAStage(String),
    MissingField(&'static str),
    DuplicateField(String),
    UnknownField(String),
    NotAString(String),
    InvalidPath {
        field: &'static str,
        source: PathParseError,
    },
}

impl fmt::Display for LookupParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed BSON: {msg}"),
            Self::NotAStage(msg) => write!(f, "not a $lookup stage: {msg}"),
            Self::MissingField(name) => write!(f, "$lookup requires '{name}'"),
            Self::DuplicateField(name) => write!(f, "$lookup field '{name}' given twice"),
            Self::UnknownField(name) => write!(f, "unknown $lookup field: {name}"),
            Self::NotAString(name) => write!(f, "$lookup field '{name}' must be a string"),
            Self::InvalidPath { field, source } => write!(f, "$lookup '{field}': {source}"),
        }
    }
}

impl std::error::Error for LookupParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPath { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// An equality `$lookup`: join `from` on `localField == foreignField`,
/// writing the matches into `as`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupSpec {
    pub from: String,
    pub local_field: FieldPath,
    pub foreign_field: FieldPath,
    #[serde(rename = "as")]
    pub as_field: FieldPath,
}

impl LookupSpec {
    /// Parse the body of a `$lookup` stage:
    /// `{ from: "c", localField: "a", foreignField: "b", as: "out" }`.
    pub fn parse(doc: &RawDocument) -> Result<Self, LookupParseError> {
        let mut from = None;
        let mut local_field = None;
        let mut foreign_field = None;
        let mut as_field = None;

        for result in doc.iter() {
            let (key, value) = result.map_err(|e| LookupParseError::Malformed(e.to_string()))?;
            let slot = match key.as_str() {
                "from" => &mut from,
                "localField" => &mut local_field,
                "foreignField" => &mut foreign_field,
                "as" => &mut as_field,
                other => return Err(LookupParseError::UnknownField(other.to_string())),
            };
            if slot.is_some() {
                return Err(LookupParseError::DuplicateField(key.as_str().to_string()));
            }
            match value {
                RawBsonRef::String(s) => *slot = Some(s),
                _ => return Err(LookupParseError::NotAString(key.as_str().to_string())),
            }
        }

        let from = from.ok_or(LookupParseError::MissingField("from"))?;
        if from.is_empty() {
            return Err(LookupParseError::Malformed(
                "'from' must name a collection".into(),
            ));
        }

        Ok(Self {
            from: from.to_string(),
            local_field: required_path("localField", local_field)?,
            foreign_field: required_path("foreignField", foreign_field)?,
            as_field: required_path("as", as_field)?,
        })
    }

    /// Parse a whole stage document: `{ "$lookup": { ... } }`.
    pub fn parse_stage(doc: &RawDocument) -> Result<Self, LookupParseError> {
        let mut iter = doc.iter();
        let (key, value) = match iter.next() {
            Some(result) => result.map_err(|e| LookupParseError::Malformed(e.to_string()))?,
            None => return Err(LookupParseError::NotAStage("empty stage document".into())),
        };
        if iter.next().is_some() {
            return Err(LookupParseError::NotAStage(
                "stage document must have exactly one key".into(),
            ));
        }
        if key.as_str() != "$lookup" {
            return Err(LookupParseError::NotAStage(format!(
                "unexpected stage {}",
                key.as_str()
            )));
        }
        match value {
            RawBsonRef::Document(body) => Self::parse(body),
            _ => Err(LookupParseError::NotAStage(
                "$lookup body must be a document".into(),
            )),
        }
    }
}

fn required_path(
    field: &'static str,
    value: Option<&str>,
) -> Result<FieldPath, LookupParseError> {
    let text = value.ok_or(LookupParseError::MissingField(field))?;
    FieldPath::parse(text).map_err(|source| LookupParseError::InvalidPath { field, source })
}

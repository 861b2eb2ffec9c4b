use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Parse error for dotted field paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParseError(pub String);

impl fmt::Display for PathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid field path: {}", self.0)
    }
}

impl std::error::Error for PathParseError {}

/// One dot-separated segment of a [`FieldPath`].
///
/// A segment made only of digits is read two ways during resolution: as a
/// field name inside documents, and as a positional index into arrays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathComponent {
    name: String,
    index: Option<usize>,
}

impl PathComponent {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            index: parse_index(name),
        }
    }

    /// The segment as a field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The segment as an array position, if it is a canonical decimal integer.
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

/// `"0"`, `"7"`, `"12"` are positions; `"01"` and `"-1"` are only names.
fn parse_index(name: &str) -> Option<usize> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.len() > 1 && name.starts_with('0') {
        return None;
    }
    name.parse().ok()
}

/// A parsed dot-notation field path such as `"a.b.c"` or `"a.0.x"`.
///
/// Serializes as its dotted text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    dotted: String,
    components: Vec<PathComponent>,
}

impl FieldPath {
    /// Parse a dotted path.
    ///
    /// Rejects empty paths, empty segments (`"a..b"`, `".a"`, `"a."`),
    /// segments starting with `$`, and embedded NUL bytes.
    pub fn parse(dotted: &str) -> Result<Self, PathParseError> {
        if dotted.is_empty() {
            return Err(PathParseError("path must not be empty".into()));
        }
        if dotted.contains('\0') {
            return Err(PathParseError(format!(
                "path must not contain NUL bytes: {dotted:?}"
            )));
        }

        let mut components = Vec::new();
        for segment in dotted.split('.') {
            if segment.is_empty() {
                return Err(PathParseError(format!(
                    "path must not contain empty segments: {dotted:?}"
                )));
            }
            if segment.starts_with('$') {
                return Err(PathParseError(format!(
                    "segment {segment:?} in {dotted:?} must not start with '$'"
                )));
            }
            components.push(PathComponent::new(segment));
        }

        Ok(Self {
            dotted: dotted.to_string(),
            components,
        })
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    /// Number of segments. Always at least one.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false; a parsed path has at least one segment.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.dotted
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted)
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.dotted
    }
}

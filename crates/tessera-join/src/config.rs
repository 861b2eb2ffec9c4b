use serde::{Deserialize, Serialize};

/// How the `$lookup` executor pairs local and foreign documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStrategy {
    /// Resolve every foreign document once, then test each local set
    /// against each foreign set.
    NestedLoop,
    /// Build a join-key index over the foreign side once, then probe it
    /// with each local set.
    #[default]
    Hash,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    pub strategy: JoinStrategy,
}

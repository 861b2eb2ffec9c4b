use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tessera_join::JoinStrategy;

#[derive(Debug, Parser)]
#[command(name = "tessera")]
#[command(about = "Run an equality $lookup over JSON document files")]
#[command(version)]
pub struct Cli {
    /// Local documents: a JSON array or one document per line (stdin if omitted)
    #[arg(short, long)]
    pub local: Option<PathBuf>,

    /// Foreign documents: a JSON array or one document per line
    #[arg(short, long)]
    pub foreign: PathBuf,

    /// A `{"$lookup": {...}}` stage document; replaces the field flags
    #[arg(long, conflicts_with_all = ["local_field", "foreign_field", "as_field"])]
    pub stage: Option<PathBuf>,

    /// Name the foreign collection is registered under
    #[arg(long, default_value = "foreign")]
    pub from: String,

    #[arg(long, required_unless_present = "stage")]
    pub local_field: Option<String>,

    #[arg(long, required_unless_present = "stage")]
    pub foreign_field: Option<String>,

    /// Output field for the joined documents
    #[arg(long = "as", default_value = "matched")]
    pub as_field: String,

    /// Join strategy; overrides the config file
    #[arg(long, value_enum, env = "TESSERA_STRATEGY")]
    pub strategy: Option<Strategy>,

    /// JSON file holding a join config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Pretty-print each output document
    #[arg(short, long)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    NestedLoop,
    Hash,
}

impl From<Strategy> for JoinStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::NestedLoop => JoinStrategy::NestedLoop,
            Strategy::Hash => JoinStrategy::Hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_flags() {
        let cli = Cli::try_parse_from([
            "tessera",
            "--local",
            "l.json",
            "--foreign",
            "f.json",
            "--local-field",
            "a.b",
            "--foreign-field",
            "c",
            "--as",
            "out",
            "--strategy",
            "nested-loop",
        ])
        .unwrap();
        assert_eq!(cli.local_field.as_deref(), Some("a.b"));
        assert_eq!(cli.as_field, "out");
        assert_eq!(cli.from, "foreign");
        assert_eq!(cli.strategy, Some(Strategy::NestedLoop));
    }

    #[test]
    fn fields_required_without_stage() {
        assert!(Cli::try_parse_from(["tessera", "--foreign", "f.json"]).is_err());
    }

    #[test]
    fn stage_replaces_fields() {
        let cli = Cli::try_parse_from(["tessera", "--foreign", "f.json", "--stage", "s.json"])
            .unwrap();
        assert!(cli.local.is_none());
        assert!(cli.local_field.is_none());

        assert!(
            Cli::try_parse_from([
                "tessera",
                "--foreign",
                "f.json",
                "--stage",
                "s.json",
                "--local-field",
                "a",
            ])
            .is_err()
        );
    }

    #[test]
    fn strategy_maps_to_join_strategy() {
        assert_eq!(JoinStrategy::from(Strategy::Hash), JoinStrategy::Hash);
        assert_eq!(JoinStrategy::from(Strategy::NestedLoop), JoinStrategy::NestedLoop);
    }
}

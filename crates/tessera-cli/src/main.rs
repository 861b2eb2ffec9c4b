mod args;
mod error;
mod input;

use std::io::{BufWriter, Write};
use std::process::ExitCode;

use bson::rawdoc;
use clap::Parser;
use tessera_join::{JoinConfig, Lookup, LookupSpec, MemoryCatalog};
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::Cli;
use error::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => input::read_config(path)?,
        None => JoinConfig::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy.into();
    }

    let spec = lookup_spec(&cli)?;
    let local = input::read_documents(cli.local.as_deref())?;
    let foreign = input::read_documents(Some(&cli.foreign))?;
    info!(
        local = local.len(),
        foreign = foreign.len(),
        from = %spec.from,
        strategy = ?config.strategy,
        "loaded documents"
    );

    let mut catalog = MemoryCatalog::new();
    catalog.insert(spec.from.clone(), foreign);
    let results = Lookup::new(spec, config).execute(&local, &catalog)?;

    let mut out = BufWriter::new(std::io::stdout().lock());
    for doc in results {
        let line = input::to_extjson(doc, cli.pretty)?;
        writeln!(out, "{line}").map_err(CliError::Write)?;
    }
    out.flush().map_err(CliError::Write)?;
    Ok(())
}

fn lookup_spec(cli: &Cli) -> Result<LookupSpec, CliError> {
    if let Some(path) = &cli.stage {
        return Ok(LookupSpec::parse_stage(&input::read_document(path)?)?);
    }
    // clap guarantees both fields when no stage is given.
    let local_field = cli.local_field.as_deref().unwrap_or_default();
    let foreign_field = cli.foreign_field.as_deref().unwrap_or_default();
    Ok(LookupSpec::parse(&rawdoc! {
        "from": cli.from.as_str(),
        "localField": local_field,
        "foreignField": foreign_field,
        "as": cli.as_field.as_str(),
    })?)
}

//! Command line front end for the in-memory search index.
//!
//! Loads the configured records and SearchParameters, builds the index, and
//! prints either the build statistics, a search result, or a single resource.

use clap::Parser;
use helios_index::{IndexConfig, Resource, SearchEngine, init_logging};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "index-cli", version)]
#[command(about = "In-memory FHIR search index")]
struct Cli {
    #[command(flatten)]
    config: IndexConfig,

    /// Search to run, e.g. "Patient?gender=male&name=sm".
    #[arg(long, conflicts_with = "read")]
    query: Option<String>,

    /// Resource to read, e.g. "Patient/1".
    #[arg(long)]
    read: Option<String>,
}

/// Splits "Type?a=1&b=2" into the type and its name/value pairs.
fn parse_query(query: &str) -> (&str, Vec<(&str, &str)>) {
    let (resource_type, params) = query.split_once('?').unwrap_or((query, ""));
    let pairs = params
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| p.split_once('=').unwrap_or((p, "")))
        .collect();
    (resource_type, pairs)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.config.log_level);

    if let Err(errors) = cli.config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let engine = SearchEngine::new().with_query_options(cli.config.query_options());
    let stats = engine.rebuild_from_config(&cli.config)?;
    info!(
        generation = stats.generation,
        records = stats.record_count,
        index_entries = stats.index_entry_count,
        extraction_failures = stats.extraction_failures,
        duration_ms = stats.duration_ms,
        "Index ready"
    );

    if let Some(query) = &cli.query {
        let (resource_type, params) = parse_query(query);
        let results: Vec<Arc<Resource>> = engine.search(resource_type, params);
        info!(resource_type, matches = results.len(), "Search complete");
        let contents: Vec<&serde_json::Value> = results.iter().map(|r| r.content()).collect();
        return print_json(&contents);
    }

    if let Some(reference) = &cli.read {
        let (resource_type, id) = reference
            .split_once('/')
            .ok_or_else(|| anyhow::anyhow!("Expected Type/id, got '{}'", reference))?;
        let resource = engine
            .read(resource_type, id)
            .ok_or_else(|| anyhow::anyhow!("{} not found", reference))?;
        return print_json(resource.content());
    }

    print_json(&engine.stats())
}

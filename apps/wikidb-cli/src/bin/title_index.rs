use std::process::ExitCode;

use clap::Parser;

use wikidb_cli::{init_tracing, open_corpus, report, title_index_storage};
use wikidb_core::config::Config;
use wikidb_core::traits::{CorpusStore, TitleIndexStorage};
use wikidb_corpus::TitleIndex;

/// Build the persisted title index ahead of serving, so the first request
/// does not pay for a full corpus scan.
#[derive(Parser)]
#[command(name = "wikidb-title-index", version)]
struct Cli {
    /// Discard an existing index file and rebuild it
    #[arg(short, long)]
    force: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?.app()?;
    init_tracing(config.verbose || cli.verbose);
    let base = std::env::current_dir()?;

    let storage = title_index_storage(&config, &base);
    if cli.force && storage.exists() {
        std::fs::remove_file(storage.path())?;
        tracing::info!(path = %storage.path().display(), "removed existing title index");
    }
    let corpus = open_corpus(&config, &base)?;
    let index = TitleIndex::load(&corpus, &storage)?;
    println!("{} titles over {} records -> {}", index.len(), corpus.size(), storage.path().display());
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

//! Wiring shared by the `wikidb` binaries: logging, corpus and title index
//! loading, and error reporting.

use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use wikidb_core::config::AppConfig;
use wikidb_core::error::Error;
use wikidb_corpus::{ArrowCorpus, JsonFileStorage, TitleIndex};

/// `RUST_LOG` wins; otherwise `info` when verbose, `warn` when not.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

pub fn open_corpus(config: &AppConfig, base: &Path) -> anyhow::Result<ArrowCorpus> {
    Ok(ArrowCorpus::open(&config.data.corpus_dir(base))?)
}

pub fn title_index_storage(config: &AppConfig, base: &Path) -> JsonFileStorage {
    JsonFileStorage::new(config.data.title_index_file(base))
}

pub fn load_title_index(config: &AppConfig, base: &Path, corpus: &ArrowCorpus) -> anyhow::Result<TitleIndex> {
    Ok(TitleIndex::load(corpus, &title_index_storage(config, base))?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Status carried by a failure; anything that is not a retrieval error is 500.
pub fn status_of(err: &anyhow::Error) -> u16 {
    err.downcast_ref::<Error>().map_or(500, Error::status)
}

pub fn exit_code(status: u16) -> u8 {
    match status {
        404 => 2,
        422 => 3,
        502 => 4,
        400 => 5,
        _ => 1,
    }
}

/// Print `{"status": .., "detail": ..}` to stderr and pick the exit code.
pub fn report(err: &anyhow::Error) -> ExitCode {
    let status = status_of(err);
    // Retrieval errors already name their cause in the message.
    let detail = match err.downcast_ref::<Error>() {
        Some(inner) => inner.to_string(),
        None => format!("{err:#}"),
    };
    tracing::debug!(status, %detail, "request failed");
    eprintln!("{}", serde_json::json!({ "status": status, "detail": detail }));
    ExitCode::from(exit_code(status))
}

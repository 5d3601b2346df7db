//! Prompt embedders for the semantic search adapter.
//!
//! `APP_USE_FAKE_EMBEDDINGS=1` (or `embed.use_fake = true`) swaps in the
//! hashing [`FakeEmbedder`]; otherwise an XLM-RoBERTa checkpoint is loaded
//! from `embed.model_dir`, `APP_MODEL_DIR`, `MODEL_DIR` or `models/bge-m3`.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

use wikidb_core::config::EmbedConfig;
use wikidb_core::traits::Embedder;

pub mod device;
pub mod fake;
pub mod model;
pub mod pool;
pub mod tokenize;

pub use fake::FakeEmbedder;
pub use model::XlmRobertaEmbedder;
pub use pool::masked_mean_l2;

pub fn use_fake_embeddings(config: &EmbedConfig) -> bool {
    config.use_fake
        || std::env::var("APP_USE_FAKE_EMBEDDINGS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
}

/// Build the embedder selected by `config`. Relative model paths resolve
/// against `base`.
pub fn get_default_embedder(config: &EmbedConfig, base: &Path) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings(config) {
        tracing::info!(dim = config.dim, "using fake embedder");
        return Ok(Box::new(FakeEmbedder::new(config.dim)));
    }
    let model_dir = resolve_model_dir(config, base)?;
    Ok(Box::new(XlmRobertaEmbedder::load(&model_dir, config.max_len, &config.query_prefix)?))
}

fn resolve_model_dir(config: &EmbedConfig, base: &Path) -> Result<PathBuf> {
    let candidates = config
        .model_dir(base)
        .into_iter()
        .chain(["APP_MODEL_DIR", "MODEL_DIR"].into_iter().filter_map(|var| std::env::var(var).ok().map(PathBuf::from)))
        .chain(std::iter::once(base.join("models/bge-m3")));
    for dir in candidates {
        if dir.exists() {
            return Ok(dir);
        }
        tracing::debug!(dir = %dir.display(), "model directory not found");
    }
    Err(anyhow!("could not locate an embedding model directory; set embed.model_dir or APP_MODEL_DIR"))
}

//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_DATA__CORPUS_DIR`) into a typed
//! [`AppConfig`]. Every field has a default, so an absent config file is fine.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `info` level logging instead of `warn`.
    pub verbose: bool,
    pub data: DataConfig,
    pub search: SearchConfig,
    pub embed: EmbedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the corpus `*.arrow` files.
    pub corpus_dir: String,
    /// JSON file with the persisted `title -> position` mapping.
    pub title_index_file: String,
    /// LanceDB database directory with the article embeddings.
    pub vector_db_dir: String,
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_percentile: f32,
    pub default_limit: usize,
    pub summary_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub model_dir: Option<String>,
    pub max_len: usize,
    /// Dimensionality used by the hashing embedder.
    pub dim: usize,
    /// Prepended to every prompt before embedding (e5-style models want `query: `).
    pub query_prefix: String,
    pub use_fake: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            corpus_dir: "wiki-dataset/train".to_string(),
            title_index_file: "title_to_index.json".to_string(),
            vector_db_dir: "txtai-wikipedia".to_string(),
            table_name: "articles".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_percentile: 0.5, default_limit: 1, summary_chars: 500 }
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self { model_dir: None, max_len: 256, dim: 1024, query_prefix: String::new(), use_fake: false }
    }
}

impl DataConfig {
    pub fn corpus_dir(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.corpus_dir)
    }

    pub fn title_index_file(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.title_index_file)
    }

    pub fn vector_db_dir(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.vector_db_dir)
    }
}

impl EmbedConfig {
    pub fn model_dir(&self, base: &Path) -> Option<PathBuf> {
        self.model_dir.as_deref().map(|dir| resolve_with_base(base, dir))
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    /// Extract and validate the typed configuration.
    pub fn app(&self) -> Result<AppConfig> {
        let config: AppConfig = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    let percentile = config.search.default_percentile;
    if !(0.0..=1.0).contains(&percentile) {
        return Err(Error::InvalidConfig(format!(
            "search.default_percentile must be within [0, 1], got {percentile}"
        )));
    }
    if config.search.summary_chars == 0 {
        return Err(Error::InvalidConfig("search.summary_chars must be positive".to_string()));
    }
    if config.embed.max_len == 0 || config.embed.dim == 0 {
        return Err(Error::InvalidConfig("embed.max_len and embed.dim must be positive".to_string()));
    }
    if config.data.table_name.trim().is_empty() {
        return Err(Error::InvalidConfig("data.table_name must not be empty".to_string()));
    }
    Ok(())
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

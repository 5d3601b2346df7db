use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No record found with title {title}")]
    NotFound { title: String },

    #[error("Search error for prompt '{prompt}': {source}")]
    Search {
        prompt: String,
        #[source]
        source: BoxError,
    },

    #[error("No results found for prompt '{prompt}'")]
    EmptyResult { prompt: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn not_found(title: impl Into<String>) -> Self {
        Self::NotFound { title: title.into() }
    }

    pub fn search(prompt: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Search { prompt: prompt.into(), source: source.into() }
    }

    pub fn empty(prompt: impl Into<String>) -> Self {
        Self::EmptyResult { prompt: prompt.into() }
    }

    /// Client-facing status for this failure. Every kind the retrieval
    /// operations can raise gets its own code.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::EmptyResult { .. } => 422,
            Self::Search { .. } => 502,
            Self::InvalidRequest(_) => 400,
            Self::Storage(_) | Self::InvalidConfig(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

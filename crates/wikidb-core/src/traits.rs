use std::collections::HashMap;

use crate::error::Result;
use crate::types::{Candidate, Position, Record, SearchRequest};

/// Read-only, position-addressed access to the corpus.
pub trait CorpusStore: Send + Sync {
    fn get(&self, position: Position) -> Result<Record>;
    fn size(&self) -> usize;

    /// Title at `position`. Stores that can read a single column should
    /// override this so index builds skip the article bodies.
    fn title(&self, position: Position) -> Result<String> {
        self.get(position).map(|record| record.title)
    }
}

/// Approximate similarity search over the corpus.
///
/// Returns candidates in descending similarity, already filtered by the
/// request's percentile threshold. Engine faults surface as `Error::Search`.
pub trait EmbeddingSearch: Send + Sync {
    fn query(&self, request: &SearchRequest) -> Result<Vec<Candidate>>;
}

/// Where the `title -> position` mapping is persisted between runs.
pub trait TitleIndexStorage: Send + Sync {
    fn exists(&self) -> bool;
    fn read(&self) -> Result<HashMap<String, Position>>;
    fn write(&self, positions: &HashMap<String, Position>) -> Result<()>;
}

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

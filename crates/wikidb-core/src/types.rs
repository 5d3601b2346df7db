//! Domain types shared by the corpus, search and retrieval crates.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Zero-based position of a record in the corpus.
pub type Position = usize;

/// An immutable corpus entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub text: String,
}

impl Record {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { title: title.into(), text: text.into() }
    }
}

/// A raw hit from the similarity search.
///
/// `id` is the corpus title. `text` is whatever body the engine stored next to
/// the vector, if any. `similarity` is engine-specific (higher is closer) and
/// only kept for diagnostics; ranking never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub text: Option<String>,
    pub similarity: f32,
}

impl Candidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), text: None, similarity: 0.0 }
    }
}

/// A resolved record paired with its lexical overlap score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredArticle {
    pub record: Record,
    pub score: u64,
}

/// Title plus the leading characters of the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub text: String,
}

impl Summary {
    /// Keep the first `max_chars` characters of the body. Counts `char`s, not
    /// bytes, and ignores word boundaries.
    pub fn from_record(record: Record, max_chars: usize) -> Self {
        let Record { title, mut text } = record;
        if let Some((cut, _)) = text.char_indices().nth(max_chars) {
            text.truncate(cut);
        }
        Self { title, text }
    }
}

/// Parameters handed to an [`EmbeddingSearch`](crate::traits::EmbeddingSearch).
///
/// `prompt` is expected to be sanitized already. `percentile` is a relevance
/// threshold in `[0, 1]`, not a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub prompt: String,
    pub percentile: f32,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(prompt: impl Into<String>, percentile: f32, limit: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&percentile) {
            return Err(Error::InvalidRequest(format!(
                "percentile must be within [0, 1], got {percentile}"
            )));
        }
        Ok(Self { prompt: prompt.into(), percentile, limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_cuts_long_bodies_at_char_count() {
        let body = "é".repeat(600);
        let summary = Summary::from_record(Record::new("T", body), 500);
        assert_eq!(summary.text.chars().count(), 500);
        assert_eq!(summary.title, "T");
    }

    #[test]
    fn summary_keeps_short_bodies_whole() {
        let summary = Summary::from_record(Record::new("T", "short body"), 500);
        assert_eq!(summary.text, "short body");
        let exact = "x".repeat(500);
        assert_eq!(Summary::from_record(Record::new("T", exact.clone()), 500).text, exact);
    }

    #[test]
    fn search_request_rejects_out_of_range_percentile() {
        assert!(SearchRequest::new("q", 0.0, 1).is_ok());
        assert!(SearchRequest::new("q", 1.0, 1).is_ok());
        assert!(matches!(SearchRequest::new("q", 1.5, 1), Err(Error::InvalidRequest(_))));
        assert!(matches!(SearchRequest::new("q", -0.1, 1), Err(Error::InvalidRequest(_))));
        assert!(matches!(SearchRequest::new("q", f32::NAN, 1), Err(Error::InvalidRequest(_))));
    }
}

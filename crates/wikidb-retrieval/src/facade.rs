use std::sync::Arc;

use wikidb_core::error::{Error, Result};
use wikidb_core::sanitize::sanitize;
use wikidb_core::traits::{CorpusStore, EmbeddingSearch};
use wikidb_core::types::{Record, SearchRequest, Summary};
use wikidb_corpus::TitleIndex;

use crate::ranker::{self, OverlapRanker};
use crate::resolver::resolve;

pub const DEFAULT_SUMMARY_CHARS: usize = 500;

/// Direct title lookup. Needs no search engine, so callers that only serve
/// lookups can skip loading one.
pub fn lookup_by_title<C>(index: &TitleIndex, corpus: &C, title: &str) -> Result<Record>
where
    C: CorpusStore + ?Sized,
{
    corpus.get(index.lookup(title)?)
}

/// Read-only retrieval operations over one corpus.
///
/// All state is shared and immutable, so a `Retriever` can be cloned into
/// every request handler.
pub struct Retriever<C: ?Sized, S: ?Sized> {
    corpus: Arc<C>,
    index: Arc<TitleIndex>,
    search: Arc<S>,
    summary_chars: usize,
}

impl<C: ?Sized, S: ?Sized> Clone for Retriever<C, S> {
    fn clone(&self) -> Self {
        Self {
            corpus: Arc::clone(&self.corpus),
            index: Arc::clone(&self.index),
            search: Arc::clone(&self.search),
            summary_chars: self.summary_chars,
        }
    }
}

impl<C, S> Retriever<C, S>
where
    C: CorpusStore + ?Sized,
    S: EmbeddingSearch + ?Sized,
{
    pub fn new(corpus: Arc<C>, index: Arc<TitleIndex>, search: Arc<S>) -> Self {
        Self { corpus, index, search, summary_chars: DEFAULT_SUMMARY_CHARS }
    }

    pub fn with_summary_chars(mut self, summary_chars: usize) -> Self {
        self.summary_chars = summary_chars;
        self
    }

    pub fn lookup_by_title(&self, title: &str) -> Result<Record> {
        lookup_by_title(&self.index, self.corpus.as_ref(), title)
    }

    /// Similarity-ordered hits with bodies cut to the summary length.
    pub fn search_summaries(&self, prompt: &str, percentile: f32, limit: usize) -> Result<Vec<Summary>> {
        let (_, records) = self.candidates(prompt, percentile, limit)?;
        Ok(records
            .into_iter()
            .map(|record| Summary::from_record(record, self.summary_chars))
            .collect())
    }

    /// Similarity-ordered hits with full bodies.
    pub fn search_articles(&self, prompt: &str, percentile: f32, limit: usize) -> Result<Vec<Record>> {
        self.candidates(prompt, percentile, limit).map(|(_, records)| records)
    }

    /// The candidate with the highest overlap score; the earliest wins ties.
    pub fn top_article(&self, prompt: &str, percentile: f32, limit: usize) -> Result<Record> {
        let (request, records) = self.candidates(prompt, percentile, limit)?;
        let scored = OverlapRanker::new(&request.prompt).score_all(records);
        let best = ranker::best_one(scored).ok_or_else(|| Error::empty(prompt))?;
        tracing::debug!(title = %best.record.title, score = best.score, "top article");
        Ok(best.record)
    }

    /// `n >= 0` gives the `n` best strongest first, `n < 0` the `|n|` best
    /// strongest last.
    pub fn top_n_articles(&self, prompt: &str, percentile: f32, limit: usize, n: isize) -> Result<Vec<Record>> {
        let (request, records) = self.candidates(prompt, percentile, limit)?;
        let scored = OverlapRanker::new(&request.prompt).score_all(records);
        Ok(ranker::select(scored, n).into_iter().map(|article| article.record).collect())
    }

    // Sanitize, search, resolve. An empty hit list is an error, never an
    // empty success.
    fn candidates(&self, prompt: &str, percentile: f32, limit: usize) -> Result<(SearchRequest, Vec<Record>)> {
        let request = SearchRequest::new(sanitize(prompt), percentile, limit)?;
        let candidates = self.search.query(&request)?;
        tracing::debug!(prompt = %request.prompt, percentile, limit, hits = candidates.len(), "semantic search");
        if candidates.is_empty() {
            return Err(Error::empty(prompt));
        }
        let records = resolve(&candidates, &self.index, self.corpus.as_ref())?;
        Ok((request, records))
    }
}

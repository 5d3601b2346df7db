//! Persisted `title -> position` lookup over a corpus.
//!
//! Built by one full scan when nothing is persisted, otherwise read back from
//! storage. Duplicate titles keep the last position seen.

use std::collections::HashMap;

use indicatif::{ProgressBar, ProgressStyle};

use wikidb_core::error::{Error, Result};
use wikidb_core::traits::{CorpusStore, TitleIndexStorage};
use wikidb_core::types::Position;

const PROGRESS_STEP: usize = 4096;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleIndex {
    positions: HashMap<String, Position>,
}

impl TitleIndex {
    /// Read the persisted index, or build it from `corpus` and persist it.
    pub fn load<C, S>(corpus: &C, storage: &S) -> Result<Self>
    where
        C: CorpusStore + ?Sized,
        S: TitleIndexStorage + ?Sized,
    {
        if storage.exists() {
            let positions = storage.read()?;
            let index = Self::from_positions(positions, corpus.size())?;
            tracing::info!(titles = index.len(), "loaded persisted title index");
            return Ok(index);
        }
        let index = Self::build(corpus)?;
        storage.write(&index.positions)?;
        tracing::info!(titles = index.len(), "built and persisted title index");
        Ok(index)
    }

    /// Scan the whole corpus once. Nothing is persisted.
    pub fn build<C: CorpusStore + ?Sized>(corpus: &C) -> Result<Self> {
        let size = corpus.size();
        let pb = ProgressBar::new(size as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} titles ({percent}%)")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut positions = HashMap::with_capacity(size);
        for position in 0..size {
            positions.insert(corpus.title(position)?, position);
            if position % PROGRESS_STEP == 0 {
                pb.set_position(position as u64);
            }
        }
        pb.finish_and_clear();

        if positions.len() < size {
            tracing::warn!(
                duplicates = size - positions.len(),
                "corpus has duplicate titles; later records shadow earlier ones"
            );
        }
        Ok(Self { positions })
    }

    /// Wrap an existing mapping, rejecting positions outside the corpus.
    pub fn from_positions(positions: HashMap<String, Position>, corpus_size: usize) -> Result<Self> {
        if let Some((title, position)) = positions.iter().find(|&(_, &p)| p >= corpus_size) {
            return Err(Error::Storage(format!(
                "title index entry '{title}' points at {position}, corpus has {corpus_size} records; delete the index file to rebuild it"
            )));
        }
        Ok(Self { positions })
    }

    pub fn lookup(&self, title: &str) -> Result<Position> {
        self.positions.get(title).copied().ok_or_else(|| Error::not_found(title))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCorpus;
    use crate::storage::MemoryStorage;
    use wikidb_core::types::Record;

    fn corpus() -> MemoryCorpus {
        MemoryCorpus::new(vec![
            Record::new("Alpha", "first"),
            Record::new("Beta", "second"),
            Record::new("Alpha", "third"),
        ])
    }

    #[test]
    fn duplicate_titles_keep_last_position() {
        let index = TitleIndex::build(&corpus()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("Alpha").unwrap(), 2);
        assert_eq!(index.lookup("Beta").unwrap(), 1);
    }

    #[test]
    fn missing_title_is_not_found() {
        let index = TitleIndex::build(&corpus()).unwrap();
        assert!(matches!(index.lookup("Gamma"), Err(Error::NotFound { title }) if title == "Gamma"));
        assert!(matches!(index.lookup("alpha"), Err(Error::NotFound { .. })), "lookup is case sensitive");
    }

    #[test]
    fn load_builds_once_then_reads_back() {
        let corpus = corpus();
        let storage = MemoryStorage::new();
        let first = TitleIndex::load(&corpus, &storage).unwrap();
        assert_eq!(storage.writes(), 1);
        let second = TitleIndex::load(&corpus, &storage).unwrap();
        assert_eq!(storage.writes(), 1, "persisted copy is reused");
        assert_eq!(first, second);
    }

    #[test]
    fn persisted_positions_past_corpus_end_are_rejected() {
        let storage = MemoryStorage::with_positions(HashMap::from([("Ghost".to_string(), 10)]));
        assert!(matches!(TitleIndex::load(&corpus(), &storage), Err(Error::Storage(_))));
    }
}

use wikidb_core::error::{Error, Result};
use wikidb_core::traits::CorpusStore;
use wikidb_core::types::{Position, Record};

/// Corpus held entirely in a `Vec`. Handy for tests and small fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    records: Vec<Record>,
}

impl MemoryCorpus {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl From<Vec<Record>> for MemoryCorpus {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl CorpusStore for MemoryCorpus {
    fn get(&self, position: Position) -> Result<Record> {
        self.records.get(position).cloned().ok_or_else(|| {
            Error::Storage(format!("position {position} out of range for corpus of {}", self.records.len()))
        })
    }

    fn size(&self) -> usize {
        self.records.len()
    }
}

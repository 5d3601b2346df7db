use wikidb_core::error::Result;
use wikidb_core::traits::CorpusStore;
use wikidb_core::types::{Candidate, Record};
use wikidb_corpus::TitleIndex;

/// Fetch the record behind every candidate, in candidate order.
///
/// Fails on the first id the title index does not know; no partial result is
/// returned.
pub fn resolve<C>(candidates: &[Candidate], index: &TitleIndex, corpus: &C) -> Result<Vec<Record>>
where
    C: CorpusStore + ?Sized,
{
    candidates
        .iter()
        .map(|candidate| corpus.get(index.lookup(&candidate.id)?))
        .collect()
}

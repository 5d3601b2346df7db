//! wikidb-retrieval
//!
//! Semantic candidates in, ranked articles out: resolves search hits against
//! the title index, re-ranks them by lexical overlap with the prompt, and
//! exposes the read-only operations served to clients.

pub mod facade;
pub mod ranker;
pub mod resolver;

pub use facade::{lookup_by_title, Retriever};
pub use ranker::OverlapRanker;
pub use resolver::resolve;

//! wikidb-corpus
//!
//! Position-addressed corpus stores and the persisted title index that maps
//! article titles onto those positions.

pub mod arrow_store;
pub mod memory;
pub mod storage;
pub mod title_index;

pub use arrow_store::ArrowCorpus;
pub use memory::MemoryCorpus;
pub use storage::{JsonFileStorage, MemoryStorage};
pub use title_index::TitleIndex;

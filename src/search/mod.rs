//! TF-IDF nearest-neighbor search over stored collections

pub mod engine;
pub mod errors;
pub mod index;
pub mod loader;
pub mod neighbors;
pub mod registry;
pub mod vectorizer;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::QueryEngine;
pub use errors::SearchError;
pub use index::{CollectionIndex, Corpus, SearchHit};
pub use loader::{CorpusLoader, DocumentStore};
pub use neighbors::{NearestNeighbors, Neighbor};
pub use registry::{IndexRegistry, IndexStatus, RebuildReport};
pub use vectorizer::{SparseVector, TfidfVectorizer};

//! Corpus loading from the document store


use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::database::sqlite::Database;
use crate::database::sqlite::models::Article;
use crate::search::SearchError;
use crate::search::index::Corpus;

/// The two store operations the search core relies on
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Names of every collection currently in the store
    async fn list_collection_names(&self) -> Result<Vec<String>, SearchError>;

    /// Every document of `collection`, in store order
    async fn fetch_documents(&self, collection: &str) -> Result<Vec<Article>, SearchError>;
}

#[async_trait]
impl DocumentStore for Database {
    async fn list_collection_names(&self) -> Result<Vec<String>, SearchError> {
        Database::list_collection_names(self)
            .await
            .map_err(|e| SearchError::StoreUnavailable(format!("{:#}", e)))
    }

    async fn fetch_documents(&self, collection: &str) -> Result<Vec<Article>, SearchError> {
        Database::list_articles(self, collection)
            .await
            .map_err(|e| SearchError::StoreUnavailable(format!("{:#}", e)))
    }
}

/// Fetches whole collections for index builds
#[derive(Clone)]
pub struct CorpusLoader {
    store: Arc<dyn DocumentStore>,
}

impl CorpusLoader {
    #[inline]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Load every document of `collection`.
    ///
    /// Does not check that the collection exists; an unknown name simply
    /// yields an empty corpus.
    #[inline]
    pub async fn load(&self, collection: &str) -> Result<Corpus, SearchError> {
        debug!("Loading corpus for collection {}", collection);

        let corpus = self
            .store
            .fetch_documents(collection)
            .await
            .inspect_err(|e| error!("Failed to load collection {}: {}", collection, e))?;

        debug!(
            "Loaded {} documents from collection {}",
            corpus.len(),
            collection
        );
        Ok(corpus)
    }
}

impl std::fmt::Debug for CorpusLoader {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusLoader").finish_non_exhaustive()
    }
}

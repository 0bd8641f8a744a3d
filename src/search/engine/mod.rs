//! Query entry point: validates the request, resolves the collection's
//! index through the registry and ranks documents against the query.


use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::database::sqlite::models::Article;
use crate::search::SearchError;
use crate::search::index::{CollectionIndex, SearchHit};
use crate::search::loader::{CorpusLoader, DocumentStore};
use crate::search::registry::{IndexRegistry, RebuildReport};

pub struct QueryEngine {
    store: Arc<dyn DocumentStore>,
    registry: Arc<IndexRegistry>,
    neighbors: usize,
}

impl QueryEngine {
    /// Create an engine with its own registry over `store`
    #[inline]
    pub fn new(store: Arc<dyn DocumentStore>, config: &SearchConfig) -> Self {
        let registry = Arc::new(IndexRegistry::new(
            CorpusLoader::new(Arc::clone(&store)),
            config.clone(),
        ));
        Self::with_registry(store, registry)
    }

    /// Create an engine sharing an existing registry
    #[inline]
    pub fn with_registry(store: Arc<dyn DocumentStore>, registry: Arc<IndexRegistry>) -> Self {
        let neighbors = registry.config().neighbors;
        Self {
            store,
            registry,
            neighbors,
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<IndexRegistry> {
        &self.registry
    }

    /// Number of results returned by [`QueryEngine::search`]
    #[inline]
    pub fn neighbors(&self) -> usize {
        self.neighbors
    }

    /// Articles of `collection` nearest to `query`, nearest first
    #[inline]
    pub async fn search(&self, collection: &str, query: &str) -> Result<Vec<Article>, SearchError> {
        let index = self.resolve(collection, query).await?;
        Ok(index.query(query, self.neighbors))
    }

    /// Like [`QueryEngine::search`] but with cosine distances and an explicit limit
    #[inline]
    pub async fn search_scored(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if limit == 0 {
            return Err(SearchError::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }

        let index = self.resolve(collection, query).await?;
        Ok(index.query_scored(query, limit))
    }

    /// Rebuild the index of `collection` from the store's current contents
    #[inline]
    pub async fn refresh(&self, collection: &str) -> Result<Arc<CollectionIndex>, SearchError> {
        self.ensure_exists(collection).await?;

        self.registry
            .rebuild(collection)
            .await
            .map_err(|e| e.into_index_unavailable(collection))
    }

    /// Build indexes for every collection currently in the store
    #[inline]
    pub async fn warm_up(&self) -> Result<RebuildReport, SearchError> {
        let names = self.store.list_collection_names().await?;
        info!("Warming indexes for {} collections", names.len());

        let report = self.registry.rebuild_all(&names).await;
        for (collection, e) in &report.failed {
            warn!("Could not warm index for {}: {}", collection, e);
        }
        Ok(report)
    }

    async fn resolve(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<Arc<CollectionIndex>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidArgument(
                "query must not be empty".to_string(),
            ));
        }

        self.ensure_exists(collection).await?;

        self.registry
            .get_or_build(collection)
            .await
            .map_err(|e| e.into_index_unavailable(collection))
    }

    /// Fail with `CollectionNotFound` unless the store lists `collection`.
    /// The cached index of a collection that has gone away is dropped.
    async fn ensure_exists(&self, collection: &str) -> Result<(), SearchError> {
        let names = self
            .store
            .list_collection_names()
            .await
            .map_err(|e| e.into_index_unavailable(collection))?;
        if names.iter().any(|name| name == collection) {
            return Ok(());
        }

        debug!("Request for unknown collection {}", collection);
        if self.registry.evict(collection).await {
            info!("Dropped index of removed collection {}", collection);
        }
        Err(SearchError::CollectionNotFound(collection.to_string()))
    }
}

impl std::fmt::Debug for QueryEngine {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("registry", &self.registry)
            .field("neighbors", &self.neighbors)
            .finish_non_exhaustive()
    }
}

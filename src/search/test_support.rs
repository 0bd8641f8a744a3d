// In-memory document store for search tests

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::database::sqlite::models::Article;
use crate::search::SearchError;
use crate::search::loader::DocumentStore;

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<Article>>>,
    fetches: AtomicUsize,
    unavailable: AtomicBool,
    fetch_delay: Duration,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps for `delay` first so concurrent callers interleave
    pub(crate) fn with_fetch_delay(delay: Duration) -> Self {
        Self {
            fetch_delay: delay,
            ..Self::default()
        }
    }

    pub(crate) fn insert_collection(&self, name: &str, articles: Vec<Article>) {
        self.collections
            .write()
            .expect("store lock poisoned")
            .insert(name.to_string(), articles);
    }

    pub(crate) fn remove_collection(&self, name: &str) {
        self.collections
            .write()
            .expect("store lock poisoned")
            .remove(name);
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), SearchError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(SearchError::StoreUnavailable(
                "connection refused".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_collection_names(&self) -> Result<Vec<String>, SearchError> {
        self.check_available()?;
        Ok(self
            .collections
            .read()
            .expect("store lock poisoned")
            .keys()
            .cloned()
            .collect())
    }

    async fn fetch_documents(&self, collection: &str) -> Result<Vec<Article>, SearchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.check_available()?;

        Ok(self
            .collections
            .read()
            .expect("store lock poisoned")
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }
}

pub(crate) fn article(collection: &str, id: &str, title: &str, summary: &str) -> Article {
    Article {
        id: id.to_string(),
        collection: collection.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        published: "2023-05-01T00:00:00".to_string(),
        pdf_link: format!("https://example.com/{}.pdf", id),
    }
}

/// Six short paper abstracts used across search tests
pub(crate) fn papers() -> Vec<Article> {
    vec![
        article("papers", "p1", "Graph theory", "an introduction to graph theory"),
        article("papers", "p2", "Spectral graph theory", "eigenvalues of graph laplacians"),
        article("papers", "p3", "Deep learning", "deep neural networks for vision"),
        article("papers", "p4", "Deep learning on graphs", "graph neural networks"),
        article("papers", "p5", "Number theory", "primes and an introduction to sieves"),
        article("papers", "p6", "Vision transformers", "attention for vision tasks"),
    ]
}

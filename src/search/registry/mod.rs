//! Per-collection index cache
//!
//! Each collection key moves through `Absent -> Building -> Ready`. A build
//! in flight is a single shared future: every caller asking for the same
//! collection while it runs awaits that one build and receives its result.
//! A failed build is reported to all of its waiters and the key falls back
//! to `Absent`, so the next request tries again. `Ready` entries are only
//! replaced by an explicit rebuild.


use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::search::SearchError;
use crate::search::index::CollectionIndex;
use crate::search::loader::CorpusLoader;

type BuildResult = Result<Arc<CollectionIndex>, SearchError>;
type SharedBuild = Shared<BoxFuture<'static, BuildResult>>;

enum IndexState {
    Building { generation: u64, build: SharedBuild },
    Ready(Arc<CollectionIndex>),
}

/// Externally visible state of one collection key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    Absent,
    Building,
    Ready { documents: usize },
}

/// Outcome of [`IndexRegistry::rebuild_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Collections now serving an index, with their indexed document count
    pub ready: Vec<(String, usize)>,
    pub failed: Vec<(String, SearchError)>,
}

impl RebuildReport {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct IndexRegistry {
    loader: CorpusLoader,
    config: SearchConfig,
    entries: Mutex<HashMap<String, IndexState>>,
    next_generation: AtomicU64,
}

impl IndexRegistry {
    #[inline]
    pub fn new(loader: CorpusLoader, config: SearchConfig) -> Self {
        Self {
            loader,
            config,
            entries: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Return the cached index for `collection`, building it on a miss
    #[inline]
    pub async fn get_or_build(&self, collection: &str) -> BuildResult {
        let (generation, build) = {
            let mut entries = self.entries.lock().await;
            let in_flight = match entries.get(collection) {
                Some(IndexState::Ready(index)) => {
                    debug!("Index cache hit for collection {}", collection);
                    return Ok(Arc::clone(index));
                }
                Some(IndexState::Building { generation, build }) => {
                    debug!("Joining in-flight build for collection {}", collection);
                    Some((*generation, build.clone()))
                }
                None => None,
            };
            in_flight.unwrap_or_else(|| self.start_build(&mut entries, collection))
        };

        self.complete_build(collection, generation, build).await
    }

    /// Build `collection` again and replace its cached index.
    ///
    /// A build already in flight for the key is joined rather than
    /// duplicated. When the new build fails the key becomes absent.
    #[inline]
    pub async fn rebuild(&self, collection: &str) -> BuildResult {
        let (generation, build) = {
            let mut entries = self.entries.lock().await;
            let in_flight = match entries.get(collection) {
                Some(IndexState::Building { generation, build }) => {
                    debug!("Rebuild joins in-flight build for collection {}", collection);
                    Some((*generation, build.clone()))
                }
                Some(IndexState::Ready(_)) | None => None,
            };
            in_flight.unwrap_or_else(|| self.start_build(&mut entries, collection))
        };

        self.complete_build(collection, generation, build).await
    }

    /// Rebuild every collection in `collections` concurrently.
    ///
    /// Failures are collected per collection and never abort the others.
    #[inline]
    pub async fn rebuild_all(&self, collections: &[String]) -> RebuildReport {
        let outcomes = join_all(
            collections
                .iter()
                .map(|name| async move { (name.clone(), self.rebuild(name).await) }),
        )
        .await;

        let mut report = RebuildReport::default();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(index) => report.ready.push((name, index.len())),
                Err(e) => report.failed.push((name, e)),
            }
        }

        info!(
            "Rebuilt {} collection indexes ({} failed)",
            report.ready.len(),
            report.failed.len()
        );
        report
    }

    #[inline]
    pub async fn status(&self, collection: &str) -> IndexStatus {
        let entries = self.entries.lock().await;
        match entries.get(collection) {
            None => IndexStatus::Absent,
            Some(IndexState::Building { .. }) => IndexStatus::Building,
            Some(IndexState::Ready(index)) => IndexStatus::Ready {
                documents: index.len(),
            },
        }
    }

    /// Drop the cached index for `collection`. Returns whether one was cached.
    ///
    /// An in-flight build is left to finish and will still be cached.
    #[inline]
    pub async fn evict(&self, collection: &str) -> bool {
        let mut entries = self.entries.lock().await;
        if matches!(entries.get(collection), Some(IndexState::Ready(_))) {
            entries.remove(collection);
            debug!("Evicted index for collection {}", collection);
            true
        } else {
            false
        }
    }

    /// Names of collections with a ready index, sorted
    #[inline]
    pub async fn ready_collections(&self) -> Vec<String> {
        let entries = self.entries.lock().await;
        let mut names: Vec<String> = entries
            .iter()
            .filter(|(_, state)| matches!(state, IndexState::Ready(_)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    fn start_build(
        &self,
        entries: &mut HashMap<String, IndexState>,
        collection: &str,
    ) -> (u64, SharedBuild) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let build = build_index(
            self.loader.clone(),
            collection.to_string(),
            self.config.clone(),
        )
        .boxed()
        .shared();

        entries.insert(
            collection.to_string(),
            IndexState::Building {
                generation,
                build: build.clone(),
            },
        );

        (generation, build)
    }

    /// Await `build` and, if it is still the current build for the key,
    /// publish its result
    async fn complete_build(
        &self,
        collection: &str,
        generation: u64,
        build: SharedBuild,
    ) -> BuildResult {
        let outcome = build.await;

        let mut entries = self.entries.lock().await;
        let is_current = matches!(
            entries.get(collection),
            Some(IndexState::Building { generation: current, .. }) if *current == generation
        );

        if is_current {
            match &outcome {
                Ok(index) => {
                    entries.insert(
                        collection.to_string(),
                        IndexState::Ready(Arc::clone(index)),
                    );
                }
                Err(_) => {
                    entries.remove(collection);
                }
            }
        }

        outcome
    }
}

impl std::fmt::Debug for IndexRegistry {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

async fn build_index(loader: CorpusLoader, collection: String, config: SearchConfig) -> BuildResult {
    info!("Building index for collection {}", collection);

    let corpus = loader.load(&collection).await?;

    let name = collection.clone();
    let index = tokio::task::spawn_blocking(move || CollectionIndex::build(&name, corpus, &config))
        .await
        .map_err(|e| SearchError::Internal(format!("Index build task failed: {}", e)))?;

    match index {
        Some(index) => {
            info!(
                "Index ready for collection {} ({} documents)",
                collection,
                index.len()
            );
            Ok(Arc::new(index))
        }
        None => {
            warn!("No indexable documents in collection {}", collection);
            Err(SearchError::EmptyOrUnbuildableCorpus(collection))
        }
    }
}

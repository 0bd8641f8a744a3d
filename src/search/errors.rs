//! Search Error Handling
//!
//! Errors raised while loading corpora, building indexes and answering
//! queries. The type is `Clone` so a single build outcome can be handed to
//! every caller waiting on the same in-flight build.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Collection {0} has no indexable documents")]
    EmptyOrUnbuildableCorpus(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Index not available for collection {collection}: {reason}")]
    IndexUnavailable { collection: String, reason: String },

    #[error("Internal search error: {0}")]
    Internal(String),
}

impl SearchError {
    /// Whether retrying the same call later may succeed
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Internal(_))
    }

    /// Stable machine-readable name of the error kind
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::CollectionNotFound(_) => "collection_not_found",
            Self::EmptyOrUnbuildableCorpus(_) => "empty_corpus",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::IndexUnavailable { .. } => "index_unavailable",
            Self::Internal(_) => "internal",
        }
    }

    /// Wrap a build or store failure into the query-facing error
    #[inline]
    pub fn into_index_unavailable(self, collection: &str) -> Self {
        match self {
            Self::StoreUnavailable(_)
            | Self::EmptyOrUnbuildableCorpus(_)
            | Self::Internal(_) => Self::IndexUnavailable {
                collection: collection.to_string(),
                reason: self.to_string(),
            },
            other => other,
        }
    }
}

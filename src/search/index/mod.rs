
use serde::Serialize;
use tracing::debug;

use crate::config::SearchConfig;
use crate::database::sqlite::models::Article;
use crate::search::neighbors::NearestNeighbors;
use crate::search::vectorizer::TfidfVectorizer;

/// Ordered articles of one collection captured at build time
pub type Corpus = Vec<Article>;

/// A ranked search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub article: Article,
    /// Cosine distance to the query, 0.0 for an identical direction
    pub distance: f64,
}

/// Fitted vectorizer and neighbor model for one collection.
///
/// Row `i` of the model, `corpus[i]` and `documents_text[i]` always refer to
/// the same article.
#[derive(Debug, Clone)]
pub struct CollectionIndex {
    collection: String,
    vectorizer: TfidfVectorizer,
    model: NearestNeighbors,
    corpus: Corpus,
    documents_text: Vec<String>,
}

impl CollectionIndex {
    /// Build an index over `corpus`.
    ///
    /// Articles whose title and summary are both blank are left out. Returns
    /// `None` when nothing is left to index.
    #[inline]
    pub fn build(collection: &str, corpus: Corpus, config: &SearchConfig) -> Option<Self> {
        let total = corpus.len();
        let (corpus, documents_text): (Corpus, Vec<String>) = corpus
            .into_iter()
            .map(|article| {
                let text = article.text();
                (article, text)
            })
            .filter(|(_, text)| !text.trim().is_empty())
            .unzip();

        if corpus.is_empty() {
            debug!(
                "Collection {} has no indexable text ({} articles)",
                collection, total
            );
            return None;
        }

        if corpus.len() < total {
            debug!(
                "Skipped {} blank articles in collection {}",
                total - corpus.len(),
                collection
            );
        }

        let (vectorizer, rows) =
            TfidfVectorizer::fit_transform(&documents_text, config.min_document_frequency);
        let model = NearestNeighbors::fit(rows, config.neighbors);

        debug!(
            "Fitted index for {}: {} documents, {} terms",
            collection,
            corpus.len(),
            vectorizer.dimension()
        );

        Some(Self {
            collection: collection.to_string(),
            vectorizer,
            model,
            corpus,
            documents_text,
        })
    }

    /// Up to `k` articles nearest to `query`, nearest first
    #[inline]
    pub fn query(&self, query: &str, k: usize) -> Vec<Article> {
        self.query_scored(query, k)
            .into_iter()
            .map(|hit| hit.article)
            .collect()
    }

    #[inline]
    pub fn query_scored(&self, query: &str, k: usize) -> Vec<SearchHit> {
        let vector = self.vectorizer.transform(query);

        self.model
            .kneighbors_k(&vector, k)
            .into_iter()
            .map(|neighbor| SearchHit {
                article: self.corpus[neighbor.row].clone(),
                distance: neighbor.distance,
            })
            .collect()
    }

    #[inline]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[inline]
    pub fn corpus(&self) -> &[Article] {
        &self.corpus
    }

    #[inline]
    pub fn documents_text(&self) -> &[String] {
        &self.documents_text
    }

    #[inline]
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    #[inline]
    pub fn model(&self) -> &NearestNeighbors {
        &self.model
    }

    /// Number of indexed articles
    #[inline]
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

//! TF-IDF text vectorization
//!
//! Terms are lowercased words of at least two word characters. The fitted
//! vocabulary keeps terms present in at least `min_df` documents, indexed
//! in lexicographic order. Weights use smoothed idf
//! (`ln((1 + n) / (1 + df)) + 1`) over raw term counts and every vector is
//! L2-normalized.


use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use fancy_regex::Regex;
use itertools::Itertools;

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// Split text into lowercase terms
#[inline]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_REGEX
        .find_iter(&lowered)
        .flatten()
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Sparse vector of `(term index, weight)` pairs sorted by term index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from unordered entries; zero weights are dropped
    #[inline]
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(_, weight)| weight != 0.0);
        entries.sort_unstable_by_key(|&(index, _)| index);
        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of non-zero components
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map_or(0.0, |pos| self.entries[pos].1)
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|&(_, weight)| weight * weight)
            .sum::<f64>()
            .sqrt()
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        let mut left = self.entries.iter().peekable();
        let mut right = other.entries.iter().peekable();
        let mut sum = 0.0;

        while let (Some(&&(li, lw)), Some(&&(ri, rw))) = (left.peek(), right.peek()) {
            match li.cmp(&ri) {
                std::cmp::Ordering::Less => {
                    left.next();
                }
                std::cmp::Ordering::Greater => {
                    right.next();
                }
                std::cmp::Ordering::Equal => {
                    sum += lw * rw;
                    left.next();
                    right.next();
                }
            }
        }

        sum
    }

    fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for entry in &mut self.entries {
                entry.1 /= norm;
            }
        }
        self
    }
}

/// A TF-IDF transformer fitted on one corpus
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfVectorizer {
    min_df: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit on `documents` and return the vectorizer with one row per document
    #[inline]
    pub fn fit_transform<S: AsRef<str>>(documents: &[S], min_df: usize) -> (Self, Vec<SparseVector>) {
        let counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|doc| tokenize(doc.as_ref()).into_iter().counts())
            .collect();

        let vectorizer = Self::fit_counts(&counts, min_df);
        let rows = counts
            .iter()
            .map(|doc_counts| vectorizer.weigh(doc_counts))
            .collect();

        (vectorizer, rows)
    }

    /// Fit on `documents` without keeping the transformed rows
    #[inline]
    pub fn fit<S: AsRef<str>>(documents: &[S], min_df: usize) -> Self {
        Self::fit_transform(documents, min_df).0
    }

    /// Vectorize unseen text. Out-of-vocabulary terms are ignored.
    #[inline]
    pub fn transform(&self, text: &str) -> SparseVector {
        let counts = tokenize(text).into_iter().counts();
        self.weigh(&counts)
    }

    #[inline]
    pub fn min_df(&self) -> usize {
        self.min_df
    }

    /// Number of terms in the fitted vocabulary
    #[inline]
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    #[inline]
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    #[inline]
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&index| self.idf[index])
    }

    fn fit_counts(counts: &[HashMap<String, usize>], min_df: usize) -> Self {
        let doc_count = counts.len();
        let threshold = min_df.max(1);

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for doc_counts in counts {
            for term in doc_counts.keys() {
                *document_frequency.entry(term.as_str()).or_default() += 1;
            }
        }

        let retained: Vec<(&str, usize)> = document_frequency
            .into_iter()
            .filter(|&(_, df)| df >= threshold)
            .collect();

        let n = doc_count as f64;
        let idf = retained
            .iter()
            .map(|&(_, df)| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();
        let vocabulary = retained
            .into_iter()
            .enumerate()
            .map(|(index, (term, _))| (term.to_string(), index))
            .collect();

        Self {
            min_df,
            vocabulary,
            idf,
        }
    }

    fn weigh(&self, counts: &HashMap<String, usize>) -> SparseVector {
        let entries = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(term)
                    .map(|&index| (index, count as f64 * self.idf[index]))
            })
            .collect();

        SparseVector::from_entries(entries).normalized()
    }
}

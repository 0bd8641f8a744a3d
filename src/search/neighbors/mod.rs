//! Brute-force cosine nearest-neighbor search over sparse rows

#[cfg(test)]
mod tests;

use itertools::Itertools;

use crate::search::vectorizer::SparseVector;

/// One result row with its cosine distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f64,
}

/// Nearest-neighbor model fitted over a fixed matrix of rows
#[derive(Debug, Clone, PartialEq)]
pub struct NearestNeighbors {
    rows: Vec<SparseVector>,
    norms: Vec<f64>,
    n_neighbors: usize,
}

impl NearestNeighbors {
    /// Fit over `rows`. `n_neighbors` is clamped to the number of rows.
    #[inline]
    pub fn fit(rows: Vec<SparseVector>, n_neighbors: usize) -> Self {
        let norms = rows.iter().map(SparseVector::norm).collect();
        let n_neighbors = n_neighbors.min(rows.len());

        Self {
            rows,
            norms,
            n_neighbors,
        }
    }

    /// Default number of neighbors returned by [`Self::kneighbors`]
    #[inline]
    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn kneighbors(&self, query: &SparseVector) -> Vec<Neighbor> {
        self.kneighbors_k(query, self.n_neighbors)
    }

    /// The `k` rows closest to `query`, nearest first.
    ///
    /// Equal distances are ordered by ascending row index. A zero query is
    /// at distance 1.0 from every row.
    #[inline]
    pub fn kneighbors_k(&self, query: &SparseVector, k: usize) -> Vec<Neighbor> {
        let query_norm = query.norm();

        self.rows
            .iter()
            .zip(&self.norms)
            .enumerate()
            .map(|(row, (vector, &norm))| Neighbor {
                row,
                distance: cosine_distance(query, query_norm, vector, norm),
            })
            .k_smallest_by(k, |a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then_with(|| a.row.cmp(&b.row))
            })
            .collect()
    }
}

fn cosine_distance(a: &SparseVector, a_norm: f64, b: &SparseVector, b_norm: f64) -> f64 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 1.0;
    }

    let similarity = a.dot(b) / (a_norm * b_norm);
    (1.0 - similarity).clamp(0.0, 2.0)
}

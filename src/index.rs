//! Index structures for similarity retrieval
//!
//! This module provides the common [`RetrievalIndex`] trait and the exact
//! brute-force index used as ground truth for the approximate graph index
//! in [`crate::hnsw`].

use serde::Serialize;

use crate::error::{IndexError, Result};
use crate::search::exact_search;
use crate::similarity::DistanceMetric;

/// A single hit: internal position and its distance to the query
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    pub position: usize,
    pub distance: f32,
}

/// Abstract index trait for different retrieval strategies
///
/// Implementations are append-only and hand out dense positions in insertion
/// order.
pub trait RetrievalIndex {
    /// Fixed vector width
    fn dimension(&self) -> usize;

    /// Number of stored vectors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a vector, returning its position
    fn add(&mut self, vector: &[f32]) -> Result<usize>;

    /// Top-k nearest positions, ascending by distance then position
    fn query_top_k(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Stored vector at `position`
    fn reconstruct(&self, position: usize) -> Result<&[f32]>;
}

/// Brute force index - linear scan for ground truth
///
/// Useful for:
/// - Small datasets
/// - Ground truth for recall testing
/// - Baseline performance comparison
#[derive(Clone, Debug)]
pub struct BruteForceIndex {
    dimension: usize,
    metric: DistanceMetric,
    vectors: Vec<Vec<f32>>,
}

impl BruteForceIndex {
    pub fn new(dimension: usize, metric: DistanceMetric) -> Self {
        Self {
            dimension,
            metric,
            vectors: Vec::new(),
        }
    }

    /// Build index from existing vectors; positions follow slice order
    pub fn build_from_vectors(
        dimension: usize,
        metric: DistanceMetric,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }
        Ok(Self {
            dimension,
            metric,
            vectors,
        })
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}

impl RetrievalIndex for BruteForceIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.push(vector.to_vec());
        Ok(self.vectors.len() - 1)
    }

    fn query_top_k(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.vectors.is_empty() {
            return Err(IndexError::EmptyIndex);
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        Ok(exact_search(query, &self.vectors, self.metric, k))
    }

    fn reconstruct(&self, position: usize) -> Result<&[f32]> {
        self.vectors
            .get(position)
            .map(Vec::as_slice)
            .ok_or(IndexError::NotFound(position))
    }
}

//! Search helpers built on top of the index structures
//!
//! - Exact search (brute force, optionally parallel)
//! - Batch search (many queries against one index, parallel)
//! - Recall@k for measuring approximate results against ground truth

use std::collections::HashSet;

use rayon::prelude::*;

use crate::error::Result;
use crate::index::{RetrievalIndex, SearchResult};
use crate::similarity::{compute_distance, DistanceMetric};

/// Collections at least this large are scanned in parallel
const PARALLEL_SCAN_THRESHOLD: usize = 4096;

/// Exact search using brute force comparison
///
/// Computes the distance to every vector; positions are slice indices.
/// Results are ascending by distance, ties broken by lower position.
///
/// # Examples
///
/// ```
/// use profile_retrieval::search::exact_search;
/// use profile_retrieval::similarity::DistanceMetric;
///
/// let vectors = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![5.0, 5.0]];
/// let results = exact_search(&[0.9, 0.9], &vectors, DistanceMetric::SquaredEuclidean, 2);
///
/// assert_eq!(results[0].position, 1);
/// assert_eq!(results[1].position, 0);
/// ```
pub fn exact_search(
    query: &[f32],
    vectors: &[Vec<f32>],
    metric: DistanceMetric,
    k: usize,
) -> Vec<SearchResult> {
    exact_search_parallel(query, vectors, metric, k, vectors.len() >= PARALLEL_SCAN_THRESHOLD)
}

/// Exact search with an explicit parallel switch
pub fn exact_search_parallel(
    query: &[f32],
    vectors: &[Vec<f32>],
    metric: DistanceMetric,
    k: usize,
    parallel: bool,
) -> Vec<SearchResult> {
    if k == 0 || vectors.is_empty() {
        return Vec::new();
    }

    let score = |(position, vector): (usize, &Vec<f32>)| SearchResult {
        position,
        distance: compute_distance(query, vector, metric),
    };

    let mut results: Vec<SearchResult> = if parallel {
        vectors.par_iter().enumerate().map(score).collect()
    } else {
        vectors.iter().enumerate().map(score).collect()
    };

    results.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.position.cmp(&b.position))
    });
    results.truncate(k);
    results
}

/// Batch search - run many queries against one index in parallel
///
/// Fails on the first query that fails (empty index, dimension mismatch).
pub fn batch_search<I>(queries: &[Vec<f32>], index: &I, k: usize) -> Result<Vec<Vec<SearchResult>>>
where
    I: RetrievalIndex + Sync,
{
    queries
        .par_iter()
        .map(|query| index.query_top_k(query, k))
        .collect()
}

/// Compute recall@k metric for search quality evaluation
///
/// Fraction of the ground-truth top-k positions that also appear in the
/// approximate top-k.
///
/// # Returns
/// Recall score in [0, 1]
pub fn compute_recall_at_k(
    approx_results: &[SearchResult],
    exact_results: &[SearchResult],
    k: usize,
) -> f64 {
    if k == 0 || exact_results.is_empty() {
        return 0.0;
    }

    let exact_ids: HashSet<usize> = exact_results.iter().take(k).map(|r| r.position).collect();

    let matches = approx_results
        .iter()
        .take(k)
        .filter(|r| exact_ids.contains(&r.position))
        .count();

    matches as f64 / k.min(exact_results.len()) as f64
}

//! Distance metrics for dense feature vectors
//!
//! This module provides the distance functions used by the graph index and the
//! brute-force baseline, plus the small vector helpers the feature encoder
//! builds sub-vectors with.
//!
//! All metrics are *distances*: lower means more similar, and identical
//! vectors score `0.0`.

use serde::{Deserialize, Serialize};

/// Distance metric enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared L2 distance (default, matches the encoder's feature space)
    #[default]
    SquaredEuclidean,
    /// L2 distance
    Euclidean,
    /// 1 - cosine similarity
    Cosine,
}

/// Compute the distance between two vectors using the specified metric
///
/// Both slices are expected to have the same length; callers validate
/// dimensions before reaching this point.
///
/// # Examples
///
/// ```
/// use profile_retrieval::similarity::{compute_distance, DistanceMetric};
///
/// let a = [0.0, 3.0];
/// let b = [4.0, 0.0];
/// assert_eq!(compute_distance(&a, &b, DistanceMetric::SquaredEuclidean), 25.0);
/// assert_eq!(compute_distance(&a, &b, DistanceMetric::Euclidean), 5.0);
/// ```
#[inline]
pub fn compute_distance(a: &[f32], b: &[f32], metric: DistanceMetric) -> f32 {
    match metric {
        DistanceMetric::SquaredEuclidean => squared_euclidean(a, b),
        DistanceMetric::Euclidean => euclidean(a, b),
        DistanceMetric::Cosine => cosine_distance(a, b),
    }
}

/// Squared Euclidean distance
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Euclidean distance
#[inline]
pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    squared_euclidean(a, b).sqrt()
}

/// Cosine distance, `1 - cos(a, b)`
///
/// A zero vector has no direction; its distance to anything is `1.0`
/// except to another zero vector, which is `0.0`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 && norm_b == 0.0 {
        return 0.0;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Accumulate `weight * src` into `acc` elementwise
///
/// `acc` and `src` must have equal length.
#[inline]
pub fn add_scaled(acc: &mut [f32], src: &[f32], weight: f32) {
    debug_assert_eq!(acc.len(), src.len());
    for (a, s) in acc.iter_mut().zip(src) {
        *a += s * weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_euclidean_identical() {
        let a = [0.1, 0.2, 0.3];
        assert_eq!(squared_euclidean(&a, &a), 0.0);
    }

    #[test]
    fn test_squared_euclidean_known() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 6.0];
        assert!((squared_euclidean(&a, &b) - 14.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vectors() {
        let zero = [0.0; 4];
        let one = [1.0, 0.0, 0.0, 0.0];
        assert_eq!(cosine_distance(&zero, &zero), 0.0);
        assert_eq!(cosine_distance(&zero, &one), 1.0);
    }

    #[test]
    fn test_cosine_parallel() {
        let a = [1.0, 1.0];
        let b = [3.0, 3.0];
        assert!(cosine_distance(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_add_scaled() {
        let mut acc = [1.0, 1.0];
        add_scaled(&mut acc, &[2.0, 4.0], 0.5);
        assert_eq!(acc, [2.0, 3.0]);
    }

    #[test]
    fn test_metric_default() {
        assert_eq!(DistanceMetric::default(), DistanceMetric::SquaredEuclidean);
    }
}

use profile_retrieval::{
    hnsw::{HnswConfig, HnswIndex},
    index::{BruteForceIndex, RetrievalIndex},
    search::{batch_search, compute_recall_at_k, exact_search, exact_search_parallel},
    similarity::DistanceMetric,
    IndexError,
};

fn grid_corpus(side: usize) -> Vec<Vec<f32>> {
    let mut vectors = Vec::with_capacity(side * side);
    for x in 0..side {
        for y in 0..side {
            vectors.push(vec![x as f32, y as f32]);
        }
    }
    vectors
}

#[test]
fn test_exact_search_finds_grid_neighbors() {
    let vectors = grid_corpus(10);
    let results = exact_search(&[4.1, 4.0], &vectors, DistanceMetric::SquaredEuclidean, 5);

    assert_eq!(results.len(), 5);
    // (4, 4) sits at position 4 * 10 + 4
    assert_eq!(results[0].position, 44);
    assert!(results[0].distance < 0.011);
}

#[test]
fn test_exact_search_parallel_matches_sequential() {
    let vectors = grid_corpus(40);
    let query = [17.3, 22.8];
    let seq = exact_search_parallel(&query, &vectors, DistanceMetric::Euclidean, 15, false);
    let par = exact_search_parallel(&query, &vectors, DistanceMetric::Euclidean, 15, true);
    assert_eq!(seq, par);
}

#[test]
fn test_batch_search_over_hnsw() {
    let vectors = grid_corpus(20);
    let mut index = HnswIndex::new(2, HnswConfig::default()).unwrap();
    for v in &vectors {
        index.insert(v).unwrap();
    }

    let queries: Vec<Vec<f32>> = vec![vec![0.0, 0.0], vec![19.0, 19.0], vec![10.2, 5.1]];
    let results = batch_search(&queries, &index, 3).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0][0].position, 0);
    assert_eq!(results[1][0].position, 399);
    assert_eq!(results[2][0].position, 10 * 20 + 5);
    for hits in &results {
        assert_eq!(hits.len(), 3);
    }
}

#[test]
fn test_batch_search_propagates_errors() {
    let index = BruteForceIndex::new(2, DistanceMetric::SquaredEuclidean);
    let err = batch_search(&[vec![0.0, 0.0]], &index, 1).unwrap_err();
    assert!(matches!(err, IndexError::EmptyIndex));
}

#[test]
fn test_hnsw_matches_brute_force_on_grid() {
    let vectors = grid_corpus(15);
    let mut hnsw = HnswIndex::new(2, HnswConfig::default()).unwrap();
    let mut exact = BruteForceIndex::new(2, DistanceMetric::SquaredEuclidean);
    for v in &vectors {
        hnsw.add(v).unwrap();
        exact.add(v).unwrap();
    }

    let queries: Vec<Vec<f32>> = (0..20)
        .map(|i| vec![(i as f32 * 0.71) % 14.0, (i as f32 * 1.37) % 14.0])
        .collect();
    let approx = batch_search(&queries, &hnsw, 5).unwrap();
    let truth = batch_search(&queries, &exact, 5).unwrap();

    let mean: f64 = approx
        .iter()
        .zip(&truth)
        .map(|(a, t)| compute_recall_at_k(a, t, 5))
        .sum::<f64>()
        / queries.len() as f64;
    assert!(mean >= 0.9, "Mean recall should be >= 0.9, got {}", mean);
}

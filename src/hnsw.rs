//! Hierarchical Navigable Small World (HNSW) Index
//!
//! HNSW is a graph-based approximate nearest neighbor search algorithm that
//! provides logarithmic search complexity with high recall.
//!
//! # Algorithm Overview
//!
//! HNSW builds a multi-layer graph where:
//! - Each layer is a navigable small-world graph
//! - Layer 0 holds every node, higher layers a shrinking random subset
//! - Search starts from the top layer entry point and descends
//! - Each layer refines the search with denser connections
//!
//! Nodes live in a single arena indexed by their internal position, and
//! neighbor lists hold positions rather than references. Positions are
//! assigned in insertion order starting at 0 and are never reused.
//!
//! Results are approximate: recall depends on `m`, `ef_construction` and
//! `ef_search`, and is measured against [`BruteForceIndex`] in the tests
//! rather than guaranteed.
//!
//! # Performance Characteristics
//!
//! | Metric | Complexity |
//! |--------|------------|
//! | Build  | O(N log N) |
//! | Search | O(log N)   |
//! | Insert | O(log N)   |
//! | Memory | O(N × M)   |
//!
//! # Example
//!
//! ```
//! use profile_retrieval::hnsw::{HnswConfig, HnswIndex};
//!
//! let mut index = HnswIndex::new(3, HnswConfig::default()).unwrap();
//! let a = index.insert(&[0.0, 0.0, 0.0]).unwrap();
//! let b = index.insert(&[1.0, 1.0, 1.0]).unwrap();
//! assert_eq!((a, b), (0, 1));
//!
//! let hits = index.search(&[0.9, 1.0, 1.0], 1).unwrap();
//! assert_eq!(hits[0].0, b);
//! ```
//!
//! [`BruteForceIndex`]: crate::index::BruteForceIndex

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::index::{RetrievalIndex, SearchResult};
use crate::similarity::{compute_distance, DistanceMetric};

/// Configuration for HNSW index
///
/// When deserialized, `m_max0` and `ml` left out of the input are derived
/// from `m` the same way [`HnswConfig::with_m`] does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HnswConfigFields")]
pub struct HnswConfig {
    /// Maximum number of connections per node per layer above 0 (default: 32)
    pub m: usize,
    /// Maximum number of connections at layer 0 (default: 2*M = 64)
    pub m_max0: usize,
    /// Size of the dynamic candidate list during construction (default: 128)
    pub ef_construction: usize,
    /// Size of the dynamic candidate list during search (default: 64)
    pub ef_search: usize,
    /// Level generation factor (default: 1/ln(M))
    pub ml: f64,
    /// Distance metric (default: squared Euclidean)
    pub metric: DistanceMetric,
    /// Top up heuristic selections with the closest discarded candidates
    /// until the degree cap is reached
    pub keep_pruned_connections: bool,
    /// Seed for level generation
    pub seed: u64,
}

impl Default for HnswConfig {
    fn default() -> Self {
        let m = 32;
        Self {
            m,
            m_max0: m * 2,
            ef_construction: 128,
            ef_search: 64,
            // ml = 1/ln(M) for optimal layer distribution
            ml: 1.0 / (m as f64).ln(),
            metric: DistanceMetric::SquaredEuclidean,
            keep_pruned_connections: true,
            seed: 0x5DEECE66D,
        }
    }
}

/// Serialized form of [`HnswConfig`]; every field is optional
#[derive(Deserialize)]
struct HnswConfigFields {
    m: Option<usize>,
    m_max0: Option<usize>,
    ef_construction: Option<usize>,
    ef_search: Option<usize>,
    ml: Option<f64>,
    metric: Option<DistanceMetric>,
    keep_pruned_connections: Option<bool>,
    seed: Option<u64>,
}

impl From<HnswConfigFields> for HnswConfig {
    fn from(fields: HnswConfigFields) -> Self {
        let mut config = match fields.m {
            Some(m) => Self::default().with_m(m),
            None => Self::default(),
        };
        if let Some(m_max0) = fields.m_max0 {
            config.m_max0 = m_max0;
        }
        if let Some(ml) = fields.ml {
            config.ml = ml;
        }
        if let Some(ef) = fields.ef_construction {
            config.ef_construction = ef;
        }
        if let Some(ef) = fields.ef_search {
            config.ef_search = ef;
        }
        if let Some(metric) = fields.metric {
            config.metric = metric;
        }
        if let Some(keep) = fields.keep_pruned_connections {
            config.keep_pruned_connections = keep;
        }
        if let Some(seed) = fields.seed {
            config.seed = seed;
        }
        config
    }
}

impl HnswConfig {
    /// Create a config optimized for speed (lower recall)
    pub fn fast() -> Self {
        Self {
            ef_construction: 64,
            ef_search: 24,
            ..Self::default().with_m(12)
        }
    }

    /// Create a config optimized for accuracy (higher recall)
    pub fn accurate() -> Self {
        Self {
            ef_construction: 400,
            ef_search: 200,
            ..Self::default().with_m(48)
        }
    }

    /// Builder method to set M (also resets `m_max0` and `ml`)
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self.m_max0 = m * 2;
        self.ml = 1.0 / (m as f64).ln();
        self
    }

    /// Builder method to set ef_search
    pub fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    /// Builder method to set ef_construction
    pub fn with_ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = ef;
        self
    }

    /// Builder method to set the distance metric
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Builder method to set the level generation seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject parameter combinations the graph cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.m < 2 {
            return Err(IndexError::InvalidConfig(format!(
                "m must be >= 2, got {}",
                self.m
            )));
        }
        if self.m_max0 < self.m {
            return Err(IndexError::InvalidConfig(format!(
                "m_max0 ({}) must be >= m ({})",
                self.m_max0, self.m
            )));
        }
        if self.ef_construction == 0 || self.ef_search == 0 {
            return Err(IndexError::InvalidConfig(
                "ef_construction and ef_search must be > 0".to_string(),
            ));
        }
        if !(self.ml.is_finite() && self.ml > 0.0) {
            return Err(IndexError::InvalidConfig(format!(
                "ml must be positive and finite, got {}",
                self.ml
            )));
        }
        Ok(())
    }
}

/// A node in the HNSW graph
#[derive(Clone, Debug)]
struct HnswNode {
    /// The vector data
    vector: Vec<f32>,
    /// Neighbors at each layer: neighbors[layer] = list of neighbor positions
    neighbors: Vec<Vec<usize>>,
}

impl HnswNode {
    fn new(vector: Vec<f32>, level: usize) -> Self {
        Self {
            vector,
            neighbors: vec![Vec::new(); level + 1],
        }
    }

    /// Highest layer this node participates in
    fn level(&self) -> usize {
        self.neighbors.len() - 1
    }
}

/// Candidate ordered by distance, ties broken by lower position
#[derive(Clone, Copy, Debug)]
struct Candidate {
    id: usize,
    distance: f32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// HNSW index for approximate nearest neighbor search
///
/// Append-only: there is no deletion or in-place update, so every position
/// returned by [`insert`](Self::insert) stays valid for the index lifetime.
#[derive(Clone, Debug)]
pub struct HnswIndex {
    config: HnswConfig,
    /// Fixed vector width
    dimension: usize,
    /// Node arena, indexed by position
    nodes: Vec<HnswNode>,
    /// Entry point (a node on the top layer)
    entry_point: Option<usize>,
    /// Current maximum level in the graph
    max_level: usize,
    rng: StdRng,
}

impl HnswIndex {
    /// Create an empty index for vectors of width `dimension`
    pub fn new(dimension: usize, config: HnswConfig) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexError::InvalidConfig(
                "dimension must be > 0".to_string(),
            ));
        }
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            dimension,
            nodes: Vec::new(),
            entry_point: None,
            max_level: 0,
            rng,
        })
    }

    /// Get the number of vectors in the index
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    /// Get the current maximum level
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Position of the current entry point, if any node exists
    pub fn entry_point(&self) -> Option<usize> {
        self.entry_point
    }

    /// Set ef_search parameter for runtime tuning
    pub fn set_ef_search(&mut self, ef: usize) {
        self.config.ef_search = ef.max(1);
    }

    /// Stored vector at `position`
    pub fn reconstruct(&self, position: usize) -> Result<&[f32]> {
        self.nodes
            .get(position)
            .map(|node| node.vector.as_slice())
            .ok_or(IndexError::NotFound(position))
    }

    /// Neighbor positions of `position` at `layer`
    ///
    /// Empty when the node does not participate in that layer.
    pub fn neighbors(&self, position: usize, layer: usize) -> Result<&[usize]> {
        let node = self
            .nodes
            .get(position)
            .ok_or(IndexError::NotFound(position))?;
        Ok(node.neighbors.get(layer).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Directed adjacency of one layer as `(from, to)` pairs
    pub fn layer_edges(&self, layer: usize) -> Vec<(usize, usize)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, node)| node.neighbors.get(layer).map(|n| (id, n)))
            .flat_map(|(id, neighbors)| neighbors.iter().map(move |&to| (id, to)))
            .collect()
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Draw `floor(-ln(U) * ml)` with `U` uniform in (0, 1]
    fn generate_level(&mut self) -> usize {
        let r: f64 = 1.0 - self.rng.gen::<f64>();
        (-r.ln() * self.config.ml).floor() as usize
    }

    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        compute_distance(a, b, self.config.metric)
    }

    fn distance_to(&self, query: &[f32], id: usize) -> f32 {
        self.distance(query, &self.nodes[id].vector)
    }

    fn degree_cap(&self, layer: usize) -> usize {
        if layer == 0 {
            self.config.m_max0
        } else {
            self.config.m
        }
    }

    /// Single-best-candidate walk: move to whichever neighbor improves on the
    /// current node until none does
    fn greedy_closest(&self, query: &[f32], start: usize, layer: usize) -> usize {
        let mut current = Candidate {
            id: start,
            distance: self.distance_to(query, start),
        };

        loop {
            let mut improved = false;
            if let Some(neighbors) = self.nodes[current.id].neighbors.get(layer) {
                for &neighbor_id in neighbors {
                    let candidate = Candidate {
                        id: neighbor_id,
                        distance: self.distance_to(query, neighbor_id),
                    };
                    if candidate < current {
                        current = candidate;
                        improved = true;
                    }
                }
            }
            if !improved {
                return current.id;
            }
        }
    }

    /// Best-first search for the `ef` nearest neighbors of `query` at `layer`
    ///
    /// Returns `(position, distance)` pairs sorted ascending by distance, then
    /// by position.
    fn search_layer(
        &self,
        query: &[f32],
        entry_points: &[usize],
        ef: usize,
        layer: usize,
    ) -> Vec<(usize, f32)> {
        let mut visited: HashSet<usize> = HashSet::with_capacity(ef * 4);

        // Min-heap for candidates to explore (closest first)
        let mut candidates: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        // Max-heap for results (furthest first for easy pruning)
        let mut results: BinaryHeap<Candidate> = BinaryHeap::new();

        for &ep in entry_points {
            if !visited.insert(ep) {
                continue;
            }
            let candidate = Candidate {
                id: ep,
                distance: self.distance_to(query, ep),
            };
            candidates.push(Reverse(candidate));
            results.push(candidate);
            if results.len() > ef {
                results.pop();
            }
        }

        while let Some(Reverse(current)) = candidates.pop() {
            // If current candidate is further than all results, we're done
            if let Some(furthest) = results.peek() {
                if results.len() >= ef && current > *furthest {
                    break;
                }
            }

            let Some(neighbors) = self.nodes[current.id].neighbors.get(layer) else {
                continue;
            };
            for &neighbor_id in neighbors {
                if !visited.insert(neighbor_id) {
                    continue;
                }
                let candidate = Candidate {
                    id: neighbor_id,
                    distance: self.distance_to(query, neighbor_id),
                };

                let should_add = results.len() < ef
                    || results.peek().map_or(true, |worst| candidate < *worst);
                if should_add {
                    candidates.push(Reverse(candidate));
                    results.push(candidate);
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        results
            .into_sorted_vec()
            .into_iter()
            .map(|c| (c.id, c.distance))
            .collect()
    }

    /// Select up to `m` neighbors from `candidates` (sorted ascending)
    ///
    /// A candidate is kept only if it is closer to the base node than to every
    /// neighbor already selected, which keeps the list from collapsing into a
    /// single cluster. With `keep_pruned_connections`, discarded candidates
    /// top the list up to `m` in distance order.
    fn select_neighbors_heuristic(&self, candidates: &[(usize, f32)], m: usize) -> Vec<usize> {
        if candidates.len() <= m {
            return candidates.iter().map(|&(id, _)| id).collect();
        }

        let mut selected: Vec<usize> = Vec::with_capacity(m);
        let mut discarded: Vec<usize> = Vec::new();

        for &(id, dist) in candidates {
            if selected.len() >= m {
                break;
            }
            let vector = &self.nodes[id].vector;
            let is_diverse = selected
                .iter()
                .all(|&sel| dist < self.distance(vector, &self.nodes[sel].vector));
            if is_diverse {
                selected.push(id);
            } else {
                discarded.push(id);
            }
        }

        if self.config.keep_pruned_connections && selected.len() < m {
            let missing = m - selected.len();
            selected.extend(discarded.into_iter().take(missing));
        }

        selected
    }

    /// Add `new_id` to `id`'s neighbor list at `layer`, pruning with the
    /// heuristic when the list exceeds its cap
    fn add_link(&mut self, id: usize, new_id: usize, layer: usize) {
        let cap = self.degree_cap(layer);
        let Some(list) = self.nodes[id].neighbors.get_mut(layer) else {
            return;
        };
        if list.contains(&new_id) {
            return;
        }
        list.push(new_id);
        if list.len() <= cap {
            return;
        }

        let base = &self.nodes[id].vector;
        let mut candidates: Vec<(usize, f32)> = self.nodes[id].neighbors[layer]
            .iter()
            .map(|&nid| (nid, self.distance(base, &self.nodes[nid].vector)))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let pruned = self.select_neighbors_heuristic(&candidates, cap);
        self.nodes[id].neighbors[layer] = pruned;
    }

    /// Insert a new vector into the index
    ///
    /// Returns the assigned position. Fails only on dimension mismatch, in
    /// which case the index is left untouched.
    pub fn insert(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dimension(vector)?;

        let position = self.nodes.len();
        let level = self.generate_level();
        let node = HnswNode::new(vector.to_vec(), level);

        // If this is the first node, just add it
        let Some(entry_point) = self.entry_point else {
            self.nodes.push(node);
            self.entry_point = Some(position);
            self.max_level = level;
            return Ok(position);
        };

        // Greedy descent through the layers above the new node's level
        let mut curr_ep = entry_point;
        for lc in (level + 1..=self.max_level).rev() {
            curr_ep = self.greedy_closest(vector, curr_ep, lc);
        }

        self.nodes.push(node);

        // Search and connect at each layer from min(level, max_level) down to 0
        let mut entry_points = vec![curr_ep];
        for lc in (0..=level.min(self.max_level)).rev() {
            let candidates =
                self.search_layer(vector, &entry_points, self.config.ef_construction, lc);

            let neighbors = self.select_neighbors_heuristic(&candidates, self.degree_cap(lc));
            for &neighbor_id in &neighbors {
                self.add_link(neighbor_id, position, lc);
            }
            self.nodes[position].neighbors[lc] = neighbors;

            entry_points = candidates.iter().map(|&(cid, _)| cid).collect();
        }

        // Update entry point if new node has higher level
        if level > self.max_level {
            tracing::debug!(position, level, "Promoted new entry point");
            self.entry_point = Some(position);
            self.max_level = level;
        }

        tracing::trace!(position, level, "Inserted node");
        Ok(position)
    }

    /// Search for the k nearest neighbors of `query`
    ///
    /// Returns `(position, distance)` pairs ascending by distance, ties broken
    /// by lower position. The candidate list at layer 0 has size
    /// `max(ef_search, k)`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        let Some(entry_point) = self.entry_point else {
            return Err(IndexError::EmptyIndex);
        };
        self.check_dimension(query)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        // Descend from the top layer down to layer 1
        let mut curr_ep = entry_point;
        for lc in (1..=self.max_level).rev() {
            curr_ep = self.greedy_closest(query, curr_ep, lc);
        }

        let mut candidates =
            self.search_layer(query, &[curr_ep], self.config.ef_search.max(k), 0);
        candidates.truncate(k);
        Ok(candidates)
    }

    /// Get index statistics
    pub fn stats(&self) -> HnswStats {
        let mut nodes_per_level = vec![0usize; self.max_level + 1];
        let mut total_edges = 0usize;

        for node in &self.nodes {
            for (layer, neighbors) in node.neighbors.iter().enumerate() {
                nodes_per_level[layer] += 1;
                total_edges += neighbors.len();
            }
        }

        HnswStats {
            num_vectors: self.nodes.len(),
            max_level: self.max_level,
            nodes_per_level,
            total_edges,
            avg_degree: if self.nodes.is_empty() {
                0.0
            } else {
                total_edges as f64 / self.nodes.len() as f64
            },
        }
    }

    /// Highest layer `position` participates in
    pub fn node_level(&self, position: usize) -> Result<usize> {
        self.nodes
            .get(position)
            .map(HnswNode::level)
            .ok_or(IndexError::NotFound(position))
    }
}

/// Statistics about the HNSW index
#[derive(Debug, Clone, Serialize)]
pub struct HnswStats {
    /// Total number of vectors
    pub num_vectors: usize,
    /// Maximum level in the hierarchy
    pub max_level: usize,
    /// Number of nodes at each level
    pub nodes_per_level: Vec<usize>,
    /// Total number of directed edges in the graph
    pub total_edges: usize,
    /// Average out-degree summed over layers
    pub avg_degree: f64,
}

impl RetrievalIndex for HnswIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.insert(vector)
    }

    fn query_top_k(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        Ok(self
            .search(query, k)?
            .into_iter()
            .map(|(position, distance)| SearchResult { position, distance })
            .collect())
    }

    fn reconstruct(&self, position: usize) -> Result<&[f32]> {
        HnswIndex::reconstruct(self, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_vectors(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..dim).map(|_| rng.gen::<f32>()).collect())
            .collect()
    }

    #[test]
    fn test_hnsw_basic() {
        let mut index = HnswIndex::new(2, HnswConfig::default()).unwrap();

        index.insert(&[0.0, 0.0]).unwrap();
        index.insert(&[5.0, 5.0]).unwrap();
        index.insert(&[10.0, 10.0]).unwrap();

        assert_eq!(index.len(), 3);

        let results = index.search(&[0.1, 0.1], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, 0);
        assert_eq!(results[1].0, 1);
    }

    #[test]
    fn test_hnsw_empty() {
        let index = HnswIndex::new(4, HnswConfig::default()).unwrap();
        let err = index.search(&[0.0; 4], 5).unwrap_err();
        assert!(matches!(err, IndexError::EmptyIndex));
    }

    #[test]
    fn test_hnsw_single_element() {
        let mut index = HnswIndex::new(3, HnswConfig::default()).unwrap();
        let pos = index.insert(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(pos, 0);

        let results = index.search(&[1.0, 2.0, 3.0], 5).unwrap();
        assert_eq!(results, vec![(0, 0.0)]);
    }

    #[test]
    fn test_dimension_mismatch_leaves_index_untouched() {
        let mut index = HnswIndex::new(3, HnswConfig::default()).unwrap();
        index.insert(&[1.0, 2.0, 3.0]).unwrap();

        let err = index.insert(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(index.len(), 1);

        let err = index.search(&[1.0; 4], 1).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_positions_are_sequential() {
        let mut index = HnswIndex::new(8, HnswConfig::fast()).unwrap();
        for (i, v) in random_vectors(50, 8, 7).iter().enumerate() {
            assert_eq!(index.insert(v).unwrap(), i);
        }
    }

    #[test]
    fn test_reconstruct() {
        let mut index = HnswIndex::new(2, HnswConfig::default()).unwrap();
        index.insert(&[0.5, 0.25]).unwrap();
        assert_eq!(index.reconstruct(0).unwrap(), &[0.5, 0.25]);
        assert!(matches!(index.reconstruct(1), Err(IndexError::NotFound(1))));
    }

    #[test]
    fn test_ties_broken_by_position() {
        let mut index = HnswIndex::new(2, HnswConfig::default()).unwrap();
        index.insert(&[1.0, 1.0]).unwrap();
        index.insert(&[1.0, 1.0]).unwrap();
        index.insert(&[1.0, 1.0]).unwrap();

        let results = index.search(&[1.0, 1.0], 3).unwrap();
        let ids: Vec<usize> = results.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_degree_caps_respected() {
        let config = HnswConfig::default().with_m(4).with_ef_construction(32);
        let mut index = HnswIndex::new(6, config).unwrap();
        for v in random_vectors(300, 6, 11) {
            index.insert(&v).unwrap();
        }

        for id in 0..index.len() {
            assert!(index.neighbors(id, 0).unwrap().len() <= 8);
            for layer in 1..=index.node_level(id).unwrap() {
                assert!(index.neighbors(id, layer).unwrap().len() <= 4);
            }
        }
    }

    #[test]
    fn test_layer_zero_reachable_from_entry_point() {
        let config = HnswConfig::default().with_ef_construction(64);
        let mut index = HnswIndex::new(5, config).unwrap();
        for v in random_vectors(400, 5, 3) {
            index.insert(&v).unwrap();
        }

        let entry = index.entry_point().unwrap();
        let mut seen = HashSet::new();
        let mut stack = vec![entry];
        while let Some(id) = stack.pop() {
            if seen.insert(id) {
                stack.extend(index.neighbors(id, 0).unwrap().iter().copied());
            }
        }
        assert_eq!(seen.len(), index.len());
    }

    #[test]
    fn test_entry_point_on_top_layer() {
        let mut index = HnswIndex::new(4, HnswConfig::default().with_m(4)).unwrap();
        for v in random_vectors(200, 4, 5) {
            index.insert(&v).unwrap();
        }
        let entry = index.entry_point().unwrap();
        assert_eq!(index.node_level(entry).unwrap(), index.max_level());
    }

    #[test]
    fn test_hnsw_config_builders() {
        let fast = HnswConfig::fast();
        assert!(fast.m < HnswConfig::default().m);
        assert!(fast.ef_search < HnswConfig::default().ef_search);

        let accurate = HnswConfig::accurate();
        assert!(accurate.m > HnswConfig::default().m);
        assert!(accurate.ef_search > HnswConfig::default().ef_search);

        let custom = HnswConfig::default()
            .with_m(24)
            .with_ef_search(100)
            .with_ef_construction(300);
        assert_eq!(custom.m, 24);
        assert_eq!(custom.m_max0, 48);
        assert_eq!(custom.ef_search, 100);
        assert_eq!(custom.ef_construction, 300);
    }

    #[test]
    fn test_config_deserialize_derives_from_m() {
        let config: HnswConfig = serde_json::from_str(r#"{"m": 8}"#).unwrap();
        assert_eq!(config.m, 8);
        assert_eq!(config.m_max0, 16);
        assert!((config.ml - 1.0 / 8f64.ln()).abs() < 1e-12);
        assert_eq!(config.ef_search, HnswConfig::default().ef_search);

        let explicit: HnswConfig =
            serde_json::from_str(r#"{"m": 8, "m_max0": 40, "ml": 0.25}"#).unwrap();
        assert_eq!(explicit.m_max0, 40);
        assert_eq!(explicit.ml, 0.25);

        let empty: HnswConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, HnswConfig::default());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = HnswConfig::fast().with_metric(DistanceMetric::Cosine);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: HnswConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_validation() {
        assert!(HnswConfig::default().validate().is_ok());
        assert!(HnswConfig::default().with_m(1).validate().is_err());
        assert!(HnswConfig::default().with_ef_search(0).validate().is_err());
        assert!(HnswIndex::new(0, HnswConfig::default()).is_err());
    }

    #[test]
    fn test_hnsw_stats() {
        let mut index = HnswIndex::new(4, HnswConfig::fast()).unwrap();
        for v in random_vectors(20, 4, 9) {
            index.insert(&v).unwrap();
        }

        let stats = index.stats();
        assert_eq!(stats.num_vectors, 20);
        assert_eq!(stats.nodes_per_level[0], 20);
        assert!(stats.total_edges > 0);
        assert!(stats.avg_degree > 0.0);
        assert_eq!(index.layer_edges(0).len(), {
            (0..20).map(|i| index.neighbors(i, 0).unwrap().len()).sum::<usize>()
        });
    }
}

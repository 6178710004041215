//! Index service: encoder -> registry -> graph index
//!
//! The graph index and the identity registry form one unit of state owned by
//! an [`IndexHandle`]. The handle is created empty, initialised exactly once
//! by `CreateIndex`, grows append-only, and is torn down as a whole.
//!
//! # Concurrency
//!
//! A single reader-writer lock guards the graph and the registry together:
//! - `add_profile` holds the write guard for the whole
//!   validate + insert + register sequence
//! - `recommend` holds the read guard for the whole
//!   resolve + reconstruct + search + map-back sequence, since a concurrent
//!   insertion rewrites neighbor lists a traversal may be walking
//!
//! Feature encoding runs before any guard is taken. Guards are released on
//! every return path.
//!
//! # Example
//!
//! ```
//! use profile_retrieval::encoder::{Employment, Gender, Profile};
//! use profile_retrieval::service::IndexService;
//!
//! let service = IndexService::with_defaults().unwrap();
//! service.create_index().unwrap();
//!
//! let profile = Profile {
//!     age: 30,
//!     employment: Employment::Employed,
//!     gender: Gender::Male,
//!     location: "Delhi".into(),
//!     languages: vec!["hindi".into()],
//! };
//! service.add_profile("u1", &profile).unwrap();
//! service.add_profile("u2", &profile).unwrap();
//!
//! let matches = service.recommend("u1", 1).unwrap();
//! assert_eq!(matches[0].external_id, "u2");
//! ```

use std::path::Path;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

use crate::encoder::{FeatureEncoder, Profile};
use crate::error::{IndexError, Result};
use crate::hnsw::{HnswConfig, HnswIndex};
use crate::registry::IdentityRegistry;

/// Width of vectors produced by the built-in category tables
pub const DEFAULT_DIMENSION: usize = 29;

/// Number of recommendations returned when the caller does not ask for a count
pub const DEFAULT_K: usize = 5;

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Vector width fixed at index creation (default: 29)
    pub dimension: usize,
    /// Recommendation count used by [`IndexService::recommend_default`] (default: 5)
    pub default_k: usize,
    /// Graph parameters
    pub hnsw: HnswConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            default_k: DEFAULT_K,
            hnsw: HnswConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ServiceConfig = serde_json::from_str(json)?;
        config.hnsw.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Builder method to set the dimension
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Builder method to set the graph parameters
    pub fn with_hnsw(mut self, hnsw: HnswConfig) -> Self {
        self.hnsw = hnsw;
        self
    }
}

/// Outcome of `CreateIndex`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CreateStatus {
    Created,
    AlreadyInitialized,
}

/// Snapshot of the index for status reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStatus {
    pub initialized: bool,
    pub dimension: Option<usize>,
    pub total_vectors: usize,
    pub max_level: usize,
}

/// One recommended entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub external_id: String,
    pub distance: f32,
}

/// Graph index and registry, always mutated together
#[derive(Debug)]
pub struct IndexState {
    graph: HnswIndex,
    registry: IdentityRegistry,
}

impl IndexState {
    fn new(dimension: usize, config: HnswConfig) -> Result<Self> {
        Ok(Self {
            graph: HnswIndex::new(dimension, config)?,
            registry: IdentityRegistry::new(),
        })
    }

    pub fn graph(&self) -> &HnswIndex {
        &self.graph
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }
}

/// Owned, lockable slot for the process-wide index
///
/// Share it through an `Arc` and inject it into an [`IndexService`].
#[derive(Debug, Default)]
pub struct IndexHandle {
    state: RwLock<Option<IndexState>>,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the graph and registry; a second call is a no-op
    pub fn init(&self, dimension: usize, config: &HnswConfig) -> Result<CreateStatus> {
        let mut guard = self.state.write();
        if guard.is_some() {
            return Ok(CreateStatus::AlreadyInitialized);
        }
        *guard = Some(IndexState::new(dimension, config.clone())?);
        Ok(CreateStatus::Created)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    /// Drop the graph and registry; returns whether anything was torn down
    pub fn teardown(&self) -> bool {
        self.state.write().take().is_some()
    }

    /// Shared access to the state
    pub fn read(&self) -> RwLockReadGuard<'_, Option<IndexState>> {
        self.state.read()
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<IndexState>> {
        self.state.write()
    }
}

/// Insert / recommend / status operations over a shared [`IndexHandle`]
#[derive(Debug)]
pub struct IndexService {
    encoder: FeatureEncoder,
    handle: Arc<IndexHandle>,
    config: ServiceConfig,
}

impl IndexService {
    pub fn new(encoder: FeatureEncoder, handle: Arc<IndexHandle>, config: ServiceConfig) -> Self {
        Self {
            encoder,
            handle,
            config,
        }
    }

    /// Built-in tables, default config, fresh handle
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            FeatureEncoder::with_builtin_tables()?,
            Arc::new(IndexHandle::new()),
            ServiceConfig::default(),
        ))
    }

    pub fn handle(&self) -> &Arc<IndexHandle> {
        &self.handle
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// `CreateIndex` with the configured dimension
    pub fn create_index(&self) -> Result<CreateStatus> {
        self.create_index_with_dimension(self.config.dimension)
    }

    /// `CreateIndex` with an explicit dimension
    ///
    /// Idempotent: once created, further calls report
    /// [`CreateStatus::AlreadyInitialized`] and leave the index alone.
    pub fn create_index_with_dimension(&self, dimension: usize) -> Result<CreateStatus> {
        let status = self.handle.init(dimension, &self.config.hnsw)?;
        match status {
            CreateStatus::Created => tracing::info!(dimension, "Index created"),
            CreateStatus::AlreadyInitialized => tracing::warn!("Index already initialized"),
        }
        Ok(status)
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.is_initialized()
    }

    /// Tear the index down; later operations fail with `NotInitialized`
    pub fn teardown(&self) -> bool {
        let torn_down = self.handle.teardown();
        if torn_down {
            tracing::info!("Index torn down");
        }
        torn_down
    }

    /// Encode and index a profile
    ///
    /// Returns the total number of indexed vectors.
    pub fn add_profile(&self, external_id: &str, profile: &Profile) -> Result<usize> {
        let vector = self.encoder.encode(profile);
        self.add_vector(external_id, &vector)
    }

    /// Index an already-encoded vector under `external_id`
    ///
    /// The duplicate check, graph insertion and registration happen under one
    /// write guard, so either all of them take effect or none does.
    pub fn add_vector(&self, external_id: &str, vector: &[f32]) -> Result<usize> {
        let mut guard = self.handle.write();
        let state = guard.as_mut().ok_or(IndexError::NotInitialized)?;

        let expected = state.graph.dimension();
        if vector.len() != expected {
            return Err(IndexError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        if state.registry.contains(external_id) {
            tracing::warn!(external_id, "Rejected duplicate id");
            return Err(IndexError::DuplicateId(external_id.to_string()));
        }

        let next = state.registry.next_position();
        if next != state.graph.len() {
            return Err(IndexError::PositionOutOfOrder {
                expected: next,
                actual: state.graph.len(),
            });
        }

        let position = state.graph.insert(vector)?;
        state.registry.register(external_id, position)?;

        let total = state.graph.len();
        tracing::debug!(external_id, position, total, "Profile indexed");
        Ok(total)
    }

    /// Most similar entities to `external_id`, nearest first
    ///
    /// The queried entity itself is never part of its own result. Returns
    /// fewer than `k` entries when the index holds fewer other entities.
    pub fn recommend(&self, external_id: &str, k: usize) -> Result<Vec<Recommendation>> {
        let guard = self.handle.read();
        let state = guard.as_ref().ok_or(IndexError::NotInitialized)?;

        if state.graph.is_empty() {
            return Err(IndexError::EmptyIndex);
        }
        let position = state.registry.resolve_to_position(external_id)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = state.graph.reconstruct(position)?;
        let hits = state.graph.search(query, k + 1)?;

        let recommendations = hits
            .into_iter()
            .filter(|&(hit, _)| hit != position)
            .take(k)
            .map(|(hit, distance)| -> Result<Recommendation> {
                Ok(Recommendation {
                    external_id: state.registry.resolve_to_id(hit)?.to_string(),
                    distance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            external_id,
            k,
            returned = recommendations.len(),
            "Recommendations served"
        );
        Ok(recommendations)
    }

    /// [`recommend`](Self::recommend) with the configured default count
    pub fn recommend_default(&self, external_id: &str) -> Result<Vec<Recommendation>> {
        self.recommend(external_id, self.config.default_k)
    }

    pub fn status(&self) -> IndexStatus {
        let guard = self.handle.read();
        match guard.as_ref() {
            Some(state) => IndexStatus {
                initialized: true,
                dimension: Some(state.graph.dimension()),
                total_vectors: state.graph.len(),
                max_level: state.graph.max_level(),
            },
            None => IndexStatus {
                initialized: false,
                dimension: None,
                total_vectors: 0,
                max_level: 0,
            },
        }
    }
}

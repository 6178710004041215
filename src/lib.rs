//! # profile-retrieval
//!
//! Similar-user retrieval over structured profiles.
//!
//! Profiles are encoded into fixed-width feature vectors by a deterministic
//! [`encoder`] driven by static category [`lookup`] tables. Vectors are stored
//! in an append-only [`hnsw`] graph for approximate nearest-neighbor search,
//! and the [`registry`] maps caller-visible ids to graph positions. The
//! [`service`] module ties these together behind a single reader-writer guard.

pub mod encoder;
pub mod error;
pub mod hnsw;
pub mod index;
pub mod lookup;
pub mod registry;
pub mod search;
pub mod service;
pub mod similarity;

// Re-export key types
pub use encoder::{Employment, FeatureEncoder, FeatureWeights, Gender, Profile};
pub use error::{IndexError, Result};
pub use hnsw::{HnswConfig, HnswIndex, HnswStats};
pub use index::{BruteForceIndex, RetrievalIndex, SearchResult};
pub use lookup::{CategoryTable, CategoryTables};
pub use registry::IdentityRegistry;
pub use service::{
    CreateStatus, IndexHandle, IndexService, IndexStatus, Recommendation, ServiceConfig,
};
pub use similarity::DistanceMetric;

//! Error types for profile indexing and retrieval

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors reported by the encoder, the graph index, the registry and the
/// service that ties them together.
///
/// All variants are recoverable at the caller boundary.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Operation attempted before the index was created
    #[error("Index not initialized")]
    NotInitialized,

    /// Vector width does not match the configured dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Configured dimension
        expected: usize,
        /// Width of the offending vector
        actual: usize,
    },

    /// Search attempted on an index holding zero vectors
    #[error("Index is empty")]
    EmptyIndex,

    /// External id is not registered
    #[error("Id not found: {0}")]
    IdNotFound(String),

    /// External id is already registered
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Internal position was never assigned
    #[error("Position not found: {0}")]
    NotFound(usize),

    /// Registry registration out of insertion order
    #[error("Position out of order: expected {expected}, got {actual}")]
    PositionOutOfOrder {
        /// Next position the registry accepts
        expected: usize,
        /// Position that was offered
        actual: usize,
    },

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed category lookup table
    #[error("Invalid lookup table: {0}")]
    InvalidTable(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Bidirectional mapping between external ids and internal positions
//!
//! Positions are dense and follow insertion order, so position -> id is a
//! plain `Vec` lookup and id -> position a hash lookup.

use std::collections::HashMap;

use crate::error::{IndexError, Result};

/// Registry of `(external id, position)` pairs
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, external_id: &str) -> bool {
        self.positions.contains_key(external_id)
    }

    /// Position the next registration must use
    pub fn next_position(&self) -> usize {
        self.ids.len()
    }

    /// Record a new pair
    ///
    /// Duplicate ids are rejected, never overwritten. `position` must equal
    /// [`next_position`](Self::next_position). On error nothing changes.
    pub fn register(&mut self, external_id: &str, position: usize) -> Result<()> {
        if self.contains(external_id) {
            return Err(IndexError::DuplicateId(external_id.to_string()));
        }
        if position != self.ids.len() {
            return Err(IndexError::PositionOutOfOrder {
                expected: self.ids.len(),
                actual: position,
            });
        }
        self.ids.push(external_id.to_string());
        self.positions.insert(external_id.to_string(), position);
        Ok(())
    }

    pub fn resolve_to_position(&self, external_id: &str) -> Result<usize> {
        self.positions
            .get(external_id)
            .copied()
            .ok_or_else(|| IndexError::IdNotFound(external_id.to_string()))
    }

    pub fn resolve_to_id(&self, position: usize) -> Result<&str> {
        self.ids
            .get(position)
            .map(String::as_str)
            .ok_or(IndexError::NotFound(position))
    }

    /// All ids in position order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.ids.iter().map(String::as_str).enumerate()
    }
}

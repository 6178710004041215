//! Category lookup tables consumed by the feature encoder
//!
//! Each categorical profile attribute maps a lowercase key to a fixed-width
//! weight vector. Keys that are absent fall back to the table's default
//! vector, so unknown values are representable but uninformative.
//!
//! The built-in tables ship as a JSON asset compiled into the crate; an
//! operator can supply their own file with the same shape:
//!
//! ```json
//! { "gender": { "width": 3, "default": [0, 0, 0], "entries": { "male": [1, 0, 0] } }, ... }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

const BUILTIN_TABLES: &str = include_str!("../assets/category_tables.json");

/// One weighted similarity table for a categorical attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    /// Width of every vector in the table
    pub width: usize,
    /// Vector used when a key is absent
    pub default: Vec<f32>,
    /// Lowercase key -> weight vector
    pub entries: HashMap<String, Vec<f32>>,
}

impl CategoryTable {
    /// Look up `key` case-insensitively, falling back to the default vector
    pub fn lookup(&self, key: &str) -> &[f32] {
        let key = key.to_lowercase();
        self.entries
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(self.default.as_slice())
    }

    /// Whether `key` has an explicit entry
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    /// Check widths and normalise keys to lowercase
    fn validate(mut self, name: &str) -> Result<Self> {
        if self.width == 0 {
            return Err(IndexError::InvalidTable(format!("{name}: width must be > 0")));
        }
        if self.default.len() != self.width {
            return Err(IndexError::InvalidTable(format!(
                "{name}: default has width {}, expected {}",
                self.default.len(),
                self.width
            )));
        }

        let mut entries = HashMap::with_capacity(self.entries.len());
        for (key, vector) in self.entries.drain() {
            if vector.len() != self.width {
                return Err(IndexError::InvalidTable(format!(
                    "{name}.{key}: width {}, expected {}",
                    vector.len(),
                    self.width
                )));
            }
            let lower = key.to_lowercase();
            if entries.insert(lower.clone(), vector).is_some() {
                return Err(IndexError::InvalidTable(format!(
                    "{name}: duplicate key '{lower}' after lowercasing"
                )));
            }
        }
        self.entries = entries;
        Ok(self)
    }
}

/// The full set of tables the encoder reads
///
/// Loaded once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTables {
    pub gender: CategoryTable,
    pub employment: CategoryTable,
    pub city: CategoryTable,
    pub language: CategoryTable,
}

impl CategoryTables {
    /// Tables shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_TABLES)
    }

    /// Parse and validate tables from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: CategoryTables = serde_json::from_str(json)?;
        Ok(Self {
            gender: raw.gender.validate("gender")?,
            employment: raw.employment.validate("employment")?,
            city: raw.city.validate("city")?,
            language: raw.language.validate("language")?,
        })
    }

    /// Load tables from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tables = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            width = tables.encoded_width(),
            "Loaded category tables"
        );
        Ok(tables)
    }

    /// Width of a vector encoded against these tables (age + every table)
    pub fn encoded_width(&self) -> usize {
        1 + self.gender.width + self.employment.width + self.city.width + self.language.width
    }
}

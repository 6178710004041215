//! Feature encoding for user profiles
//!
//! A [`Profile`] is turned into a fixed-width `Vec<f32>` by concatenating
//! weighted sub-vectors in a fixed order:
//!
//! | Segment    | Width (built-in tables) | Weight |
//! |------------|-------------------------|--------|
//! | age        | 1                       | 1.0    |
//! | gender     | 3                       | 0.3    |
//! | employment | 3                       | 0.6    |
//! | location   | 11                      | 0.8    |
//! | languages  | 11                      | 0.9    |
//!
//! Encoding is a pure function of the profile and the tables: the same input
//! always yields bit-identical output.
//!
//! # Example
//!
//! ```
//! use profile_retrieval::encoder::{Employment, FeatureEncoder, Gender, Profile};
//!
//! let encoder = FeatureEncoder::with_builtin_tables().unwrap();
//! let profile = Profile {
//!     age: 30,
//!     employment: Employment::Employed,
//!     gender: Gender::Male,
//!     location: "Delhi".to_string(),
//!     languages: vec!["hindi".to_string()],
//! };
//! let vector = encoder.encode(&profile);
//! assert_eq!(vector.len(), 29);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lookup::CategoryTables;
use crate::similarity::add_scaled;

/// Lower bound of the age normalisation range
pub const AGE_MIN: i64 = 18;
/// Upper bound of the age normalisation range
pub const AGE_MAX: i64 = 70;

/// Employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Employment {
    Student,
    Employed,
    Unemployed,
}

impl Employment {
    /// Lookup key in the employment table
    pub fn as_str(&self) -> &'static str {
        match self {
            Employment::Student => "student",
            Employment::Employed => "employed",
            Employment::Unemployed => "unemployed",
        }
    }
}

/// Gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Lookup key in the gender table
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

/// Structured user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub age: i64,
    pub employment: Employment,
    pub gender: Gender,
    /// Free-text city name, matched case-insensitively
    pub location: String,
    /// Spoken languages, matched case-insensitively
    #[serde(alias = "language", default)]
    pub languages: Vec<String>,
}

/// Per-segment weights applied before concatenation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeights {
    pub location: f32,
    pub employment: f32,
    pub gender: f32,
    /// Applied to each language vector before summing
    pub language: f32,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            location: 0.8,
            employment: 0.6,
            gender: 0.3,
            language: 0.9,
        }
    }
}

/// Maps profiles to feature vectors
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    tables: CategoryTables,
    weights: FeatureWeights,
}

impl FeatureEncoder {
    /// Create an encoder over the given tables with default weights
    pub fn new(tables: CategoryTables) -> Self {
        Self {
            tables,
            weights: FeatureWeights::default(),
        }
    }

    /// Create an encoder over the tables shipped with the crate
    pub fn with_builtin_tables() -> Result<Self> {
        Ok(Self::new(CategoryTables::builtin()?))
    }

    /// Builder method to override the segment weights
    pub fn with_weights(mut self, weights: FeatureWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Width of every vector this encoder produces
    pub fn dimension(&self) -> usize {
        self.tables.encoded_width()
    }

    pub fn tables(&self) -> &CategoryTables {
        &self.tables
    }

    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    /// Encode a profile
    ///
    /// Unknown locations and languages contribute the table defaults (zero in
    /// the built-in tables); they are never an error.
    pub fn encode(&self, profile: &Profile) -> Vec<f32> {
        let tables = &self.tables;
        let w = &self.weights;
        let mut out = Vec::with_capacity(self.dimension());

        out.push(normalize_age(profile.age));
        push_scaled(&mut out, tables.gender.lookup(profile.gender.as_str()), w.gender);
        push_scaled(
            &mut out,
            tables.employment.lookup(profile.employment.as_str()),
            w.employment,
        );
        push_scaled(&mut out, tables.city.lookup(&profile.location), w.location);

        // Languages are summed, not averaged
        let mut languages = vec![0.0f32; tables.language.width];
        for language in &profile.languages {
            add_scaled(&mut languages, tables.language.lookup(language), w.language);
        }
        out.extend_from_slice(&languages);

        out
    }
}

/// Clamp `(age - 18) / (70 - 18)` into `[0, 1]`
pub fn normalize_age(age: i64) -> f32 {
    let normalized = (age as f64 - AGE_MIN as f64) / (AGE_MAX - AGE_MIN) as f64;
    normalized.clamp(0.0, 1.0) as f32
}

fn push_scaled(out: &mut Vec<f32>, src: &[f32], weight: f32) {
    out.extend(src.iter().map(|v| v * weight));
}

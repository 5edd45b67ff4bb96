//! Embedding vectors and similarity.
//!
//! A [`Vector`] is produced once by the embedding boundary and never
//! mutated; clones share the same backing buffer. Similarity is computed
//! through the [`SimilarityCalculator`] trait so the annotation engine can
//! be driven by a different metric in tests.
//!
//! # Dimension contract
//!
//! Two vectors are only comparable when they come from the same embedding
//! model. Comparing vectors of different dimension is an integration bug
//! and panics rather than silently truncating.

use serde::Serialize;
use std::sync::Arc;

/// An immutable, fixed-dimension embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vector {
    values: Arc<[f32]>,
}

impl Vector {
    pub fn new(values: impl Into<Arc<[f32]>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Component at `index`. Panics when out of range.
    pub fn get(&self, index: usize) -> f32 {
        self.values[index]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// `Σ a[i] * b[i]`, accumulated in `f64`.
    ///
    /// # Panics
    ///
    /// If the two vectors have different dimensions.
    pub fn dot_product(&self, other: &Vector) -> f64 {
        assert_eq!(
            self.dimension(),
            other.dimension(),
            "cannot compare vectors of dimension {} and {}",
            self.dimension(),
            other.dimension()
        );

        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| f64::from(*a) * f64::from(*b))
            .sum()
    }

    /// Euclidean (L2) norm.
    pub fn norm(&self) -> f64 {
        self.values
            .iter()
            .map(|v| f64::from(*v) * f64::from(*v))
            .sum::<f64>()
            .sqrt()
    }
}

impl From<Vec<f32>> for Vector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl From<&[f32]> for Vector {
    fn from(values: &[f32]) -> Self {
        Self::new(values)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` when either vector is empty or has zero norm, so callers
/// comparing against a threshold never see NaN.
///
/// # Panics
///
/// If the vectors have different dimensions.
pub fn cosine_similarity(a: &Vector, b: &Vector) -> f64 {
    let dot = a.dot_product(b);
    if a.is_empty() {
        return 0.0;
    }

    let denom = a.norm() * b.norm();
    if denom < f64::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// A similarity metric between two embeddings.
pub trait SimilarityCalculator: Send + Sync {
    fn similarity(&self, a: &Vector, b: &Vector) -> f64;
}

/// [`SimilarityCalculator`] backed by [`cosine_similarity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl SimilarityCalculator for CosineSimilarity {
    fn similarity(&self, a: &Vector, b: &Vector) -> f64 {
        cosine_similarity(a, b)
    }
}

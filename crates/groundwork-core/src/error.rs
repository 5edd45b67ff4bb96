//! Error types for the `groundwork-core` crate.
//!
//! Only the embedding boundary can fail. Every other operation in this
//! crate is total over its inputs.

use thiserror::Error;

/// Failure to turn text into a [`Vector`](crate::vector::Vector).
#[derive(Debug, Error)]
pub enum VectorizeError {
    /// No embedding backend is available (disabled, or failed to load).
    #[error("Vectorizer unavailable: {0}")]
    Unavailable(String),

    /// The backend produced a vector of the wrong size.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the backend advertises.
        expected: usize,
        /// Dimension actually returned.
        actual: usize,
    },

    /// The backend answered without a vector for the given text.
    #[error("Empty embedding response")]
    EmptyResponse,

    /// Any other backend failure.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// A convenience result type for vectorization.
pub type Result<T> = std::result::Result<T, VectorizeError>;

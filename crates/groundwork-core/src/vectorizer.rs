//! Sentence vectorizer boundary.
//!
//! The embedding model lives outside this crate. The application passes
//! an implementation of [`SentenceVectorizer`] into the functions that
//! need one; this crate only consumes it.
//!
//! # Hidden text
//!
//! `hidden_text` (for example an entity name) biases the embedding
//! without appearing in the returned [`SentenceVector::text`]. A sentence
//! like "renewal is at risk" can then match a query about the customer
//! it implicitly refers to.

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Serialize;

use crate::error::Result;
use crate::vector::Vector;

/// A sentence and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceVector {
    pub text: String,
    pub vector: Vector,
}

impl SentenceVector {
    pub fn new(text: impl Into<String>, vector: impl Into<Vector>) -> Self {
        Self {
            text: text.into(),
            vector: vector.into(),
        }
    }
}

/// Turns sentences into embeddings.
///
/// Implementations are expected to be deterministic for a given model
/// version. Bounding concurrency against the backend is the
/// implementation's responsibility.
#[async_trait]
pub trait SentenceVectorizer: Send + Sync {
    /// Embed a single sentence, optionally biased by `hidden_text`.
    async fn vectorize(&self, text: &str, hidden_text: Option<&str>) -> Result<SentenceVector>;

    /// Embed a batch of sentences, preserving order.
    ///
    /// The default implementation embeds every sentence concurrently and
    /// fails as a whole if any sentence fails.
    async fn vectorize_all(
        &self,
        texts: &[String],
        hidden_text: Option<&str>,
    ) -> Result<Vec<SentenceVector>> {
        try_join_all(texts.iter().map(|text| self.vectorize(text, hidden_text))).await
    }
}

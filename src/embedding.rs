//! Embedding providers and the provider-backed sentence vectorizer.
//!
//! Defines the [`EmbeddingProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]**: returns errors; used when embeddings are not configured.
//! - **[`HashingProvider`]**: deterministic, offline feature hashing of word tokens.
//!
//! [`ProviderVectorizer`] adapts any provider to the core
//! [`SentenceVectorizer`] boundary: it prefixes hidden text, bounds the
//! number of in-flight provider calls, validates dimensions and memoises
//! vectors in-process.
//!
//! # Provider Selection
//!
//! ```rust
//! # use groundwork::config::EmbeddingConfig;
//! # use groundwork::embedding::create_provider;
//! let config = EmbeddingConfig::default(); // provider = "disabled"
//! let provider = create_provider(&config).unwrap();
//! assert_eq!(provider.model_name(), "disabled");
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use groundwork_core::error::VectorizeError;
use groundwork_core::vector::Vector;
use groundwork_core::vectorizer::{SentenceVector, SentenceVectorizer};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::EmbeddingConfig;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"hashing-v1"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality, `0` when disabled.
    fn dims(&self) -> usize;
    /// Embed a batch of texts, one vector per text, in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

// ============ Disabled Provider ============

/// A no-op embedding provider that always returns errors.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed_texts(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("Embedding provider is disabled")
    }
}

// ============ Hashing Provider ============

/// Offline provider that hashes lowercase word tokens into `dims` signed
/// buckets and L2-normalises the result.
///
/// Texts sharing words get similar vectors, which is enough for citation
/// matching in tests and air-gapped setups.
pub struct HashingProvider {
    model: String,
    dims: usize,
}

impl HashingProvider {
    pub fn new(model: impl Into<String>, dims: usize) -> Result<Self> {
        if dims == 0 {
            bail!("HashingProvider requires dims > 0");
        }
        Ok(Self {
            model: model.into(),
            dims,
        })
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let index = (u64::from_le_bytes(bucket) % self.dims as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Create the appropriate [`EmbeddingProvider`] based on configuration.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"hashing"` | [`HashingProvider`] |
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "hashing" => {
            let model = config.model.as_deref().unwrap_or("hashing-v1");
            let dims = config
                .dims
                .ok_or_else(|| anyhow::anyhow!("embedding.dims required for hashing provider"))?;
            Ok(Arc::new(HashingProvider::new(model, dims)?))
        }
        other => bail!("Unknown embedding provider: {}", other),
    }
}

// ============ Provider Vectorizer ============

/// Default number of memoised vectors per vectorizer.
pub const DEFAULT_CACHE_ENTRIES: usize = 10_000;

/// Bounded memo of embeddings. When full, the oldest entry is evicted.
struct VectorCache {
    capacity: usize,
    entries: HashMap<String, Vector>,
    order: VecDeque<String>,
}

impl VectorCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, key: &str) -> Option<Vector> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: String, vector: Vector) {
        if self.capacity == 0 || self.entries.contains_key(&key) {
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, vector);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// [`SentenceVectorizer`] over an [`EmbeddingProvider`].
pub struct ProviderVectorizer {
    provider: Arc<dyn EmbeddingProvider>,
    permits: Semaphore,
    cache: Mutex<VectorCache>,
}

impl ProviderVectorizer {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, max_concurrency: usize) -> Self {
        Self {
            provider,
            permits: Semaphore::new(max_concurrency.max(1)),
            cache: Mutex::new(VectorCache::new(DEFAULT_CACHE_ENTRIES)),
        }
    }

    /// Bound the memo cache to `entries` vectors; `0` disables it.
    pub fn with_cache_entries(self, entries: usize) -> Self {
        Self {
            cache: Mutex::new(VectorCache::new(entries)),
            ..self
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self::new(create_provider(config)?, config.max_concurrency)
            .with_cache_entries(config.cache_entries))
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Number of memoised vectors.
    pub fn cached(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn cache_key(&self, text: &str, hidden_text: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        for field in [self.provider.model_name(), hidden_text.unwrap_or_default(), text] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    fn cached_vector(&self, key: &str) -> Option<Vector> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
    }

    fn remember(&self, key: String, vector: Vector) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, vector);
    }

    /// Embed `inputs` with a single provider call, holding one permit.
    async fn embed_checked(&self, inputs: Vec<String>) -> Result<Vec<Vector>, VectorizeError> {
        let expected = self.provider.dims();
        if expected == 0 {
            return Err(VectorizeError::Unavailable(format!(
                "embedding provider '{}' is disabled",
                self.provider.model_name()
            )));
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| VectorizeError::Unavailable(e.to_string()))?;

        let embeddings = self.provider.embed_texts(&inputs).await?;
        if embeddings.len() != inputs.len() {
            return Err(VectorizeError::EmptyResponse);
        }

        embeddings
            .into_iter()
            .map(|embedding| {
                if embedding.len() != expected {
                    return Err(VectorizeError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    });
                }
                Ok(Vector::from(embedding))
            })
            .collect()
    }
}

/// Trimmed hidden text, `None` when blank.
fn normalise_hidden(hidden_text: Option<&str>) -> Option<&str> {
    hidden_text.map(str::trim).filter(|hidden| !hidden.is_empty())
}

/// Expects hidden text already passed through [`normalise_hidden`].
fn provider_input(text: &str, hidden_text: Option<&str>) -> String {
    match hidden_text {
        Some(hidden) => format!("{} {}", hidden, text),
        None => text.to_string(),
    }
}

#[async_trait]
impl SentenceVectorizer for ProviderVectorizer {
    async fn vectorize(
        &self,
        text: &str,
        hidden_text: Option<&str>,
    ) -> groundwork_core::error::Result<SentenceVector> {
        let hidden_text = normalise_hidden(hidden_text);
        let key = self.cache_key(text, hidden_text);
        if let Some(vector) = self.cached_vector(&key) {
            return Ok(SentenceVector::new(text, vector));
        }

        let vector = self
            .embed_checked(vec![provider_input(text, hidden_text)])
            .await?
            .into_iter()
            .next()
            .ok_or(VectorizeError::EmptyResponse)?;

        self.remember(key, vector.clone());
        Ok(SentenceVector::new(text, vector))
    }

    /// Batches every uncached sentence into one provider call.
    async fn vectorize_all(
        &self,
        texts: &[String],
        hidden_text: Option<&str>,
    ) -> groundwork_core::error::Result<Vec<SentenceVector>> {
        let hidden_text = normalise_hidden(hidden_text);
        let keys: Vec<String> = texts
            .iter()
            .map(|text| self.cache_key(text, hidden_text))
            .collect();
        let mut vectors: Vec<Option<Vector>> =
            keys.iter().map(|key| self.cached_vector(key)).collect();

        let missing: Vec<usize> = (0..texts.len()).filter(|&i| vectors[i].is_none()).collect();
        debug!(
            texts = texts.len(),
            cached = texts.len() - missing.len(),
            "vectorizing sentences"
        );

        if !missing.is_empty() {
            let inputs = missing
                .iter()
                .map(|&i| provider_input(&texts[i], hidden_text))
                .collect();
            let embedded = self.embed_checked(inputs).await?;

            for (i, vector) in missing.into_iter().zip(embedded) {
                self.remember(keys[i].clone(), vector.clone());
                vectors[i] = Some(vector);
            }
        }

        texts
            .iter()
            .zip(vectors)
            .map(|(text, vector)| {
                vector
                    .map(|vector| SentenceVector::new(text.as_str(), vector))
                    .ok_or(VectorizeError::EmptyResponse)
            })
            .collect()
    }
}

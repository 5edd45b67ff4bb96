//! TOML configuration.
//!
//! Every section and field has a default, so an empty file is a valid
//! configuration. [`load_config`] reads, parses and validates a file;
//! [`parse_config`] does the same for an in-memory string.
//!
//! ```toml
//! [retrieval]
//! min_similarity = 0.6
//! keyword_window = 2000
//!
//! [embedding]
//! provider = "hashing"
//! model = "hashing-v1"
//! dims = 256
//!
//! [logging]
//! filter = "groundwork=debug"
//! ```

use anyhow::{bail, Context, Result};
use groundwork_core::params::RetrievalParams;
use groundwork_core::trim::DEFAULT_LEADING_FRACTION;
use serde::Deserialize;
use std::path::Path;

use crate::embedding::DEFAULT_CACHE_ENTRIES;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
    #[serde(default = "default_annotation_min_words")]
    pub annotation_min_words: usize,
    #[serde(default = "default_source_min_words")]
    pub source_min_words: usize,
    #[serde(default)]
    pub keyword_window: usize,
    #[serde(default = "default_leading_fraction")]
    pub leading_fraction: f64,
    /// Character budget for the context size hook; `0` means unlimited.
    #[serde(default)]
    pub context_chars: usize,
    /// Answers whose annotation coverage falls below this are suppressed.
    #[serde(default)]
    pub min_coverage: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            annotation_min_words: default_annotation_min_words(),
            source_min_words: default_source_min_words(),
            keyword_window: 0,
            leading_fraction: default_leading_fraction(),
            context_chars: 0,
            min_coverage: 0.0,
        }
    }
}

fn default_min_similarity() -> f64 {
    RetrievalParams::default().min_similarity
}
fn default_annotation_min_words() -> usize {
    RetrievalParams::default().annotation_min_words
}
fn default_source_min_words() -> usize {
    RetrievalParams::default().source_min_words
}
fn default_leading_fraction() -> f64 {
    DEFAULT_LEADING_FRACTION
}

impl RetrievalConfig {
    /// The core tuning parameters described by this section.
    pub fn params(&self) -> RetrievalParams {
        RetrievalParams {
            min_similarity: self.min_similarity,
            annotation_min_words: self.annotation_min_words,
            source_min_words: self.source_min_words,
            keyword_window: self.keyword_window,
            leading_fraction: self.leading_fraction,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Maximum in-flight provider calls per vectorizer.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Vectors memoised per vectorizer; `0` disables the cache.
    #[serde(default = "default_cache_entries")]
    pub cache_entries: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            max_concurrency: default_max_concurrency(),
            cache_entries: default_cache_entries(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_max_concurrency() -> usize {
    8
}
fn default_cache_entries() -> usize {
    DEFAULT_CACHE_ENTRIES
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let retrieval = &config.retrieval;

    if !(-1.0..=1.0).contains(&retrieval.min_similarity) {
        bail!("retrieval.min_similarity must be in [-1.0, 1.0]");
    }

    if !(0.0..=1.0).contains(&retrieval.leading_fraction) {
        bail!("retrieval.leading_fraction must be in [0.0, 1.0]");
    }

    if !(0.0..=1.0).contains(&retrieval.min_coverage) {
        bail!("retrieval.min_coverage must be in [0.0, 1.0]");
    }

    let embedding = &config.embedding;

    match embedding.provider.as_str() {
        "disabled" | "hashing" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be disabled or hashing.",
            other
        ),
    }

    if embedding.is_enabled() {
        if embedding.dims.is_none() || embedding.dims == Some(0) {
            bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                embedding.provider
            );
        }
        if embedding.max_concurrency == 0 {
            bail!("embedding.max_concurrency must be > 0");
        }
    }

    Ok(())
}

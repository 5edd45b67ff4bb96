//! Retrieval tuning parameters, decoupled from application config.

use serde::{Deserialize, Serialize};

use crate::annotate::AnnotationParams;
use crate::trim::{KeywordTrimmer, DEFAULT_LEADING_FRACTION};

/// Thresholds shared by the context pipeline and the annotation engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalParams {
    /// Minimum cosine similarity for an answer sentence to cite a source.
    pub min_similarity: f64,
    /// Minimum words for an answer sentence to be considered for citation.
    pub annotation_min_words: usize,
    /// Minimum words for a source sentence to be embedded.
    pub source_min_words: usize,
    /// Characters kept around each keyword occurrence; `0` disables trimming.
    pub keyword_window: usize,
    /// Share of the keyword window placed before the keyword.
    pub leading_fraction: f64,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            min_similarity: 0.8,
            annotation_min_words: 3,
            source_min_words: 10,
            keyword_window: 0,
            leading_fraction: DEFAULT_LEADING_FRACTION,
        }
    }
}

impl RetrievalParams {
    pub fn annotation(&self) -> AnnotationParams {
        AnnotationParams {
            min_similarity: self.min_similarity,
            min_words: self.annotation_min_words,
        }
    }

    pub fn trimmer(&self) -> KeywordTrimmer {
        KeywordTrimmer::new(self.leading_fraction)
    }
}

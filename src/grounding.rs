//! Answer grounding.
//!
//! Runs the annotation engine over a model answer and decides whether the
//! answer is grounded well enough to show. An answer whose citation
//! coverage falls below `min_coverage` is marked as suppressed; callers
//! decide what to show instead.

use groundwork_core::annotate::AnnotationResult;
use groundwork_core::context::RagMultiDocumentContext;
use groundwork_core::params::RetrievalParams;
use groundwork_core::sentence::SentenceSplitter;
use groundwork_core::vector::SimilarityCalculator;
use groundwork_core::vectorizer::SentenceVectorizer;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::RetrievalConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundedAnswer {
    pub result: AnnotationResult,
    /// Coverage fell below the configured minimum.
    pub suppressed: bool,
}

impl GroundedAnswer {
    /// Annotated answer followed by its footnotes.
    pub fn render(&self) -> String {
        self.result.with_footnotes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grounder {
    params: RetrievalParams,
    min_coverage: f64,
}

impl Grounder {
    pub fn new(params: RetrievalParams, min_coverage: f64) -> Self {
        Self {
            params,
            min_coverage,
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.params(), config.min_coverage)
    }

    pub async fn ground<T>(
        &self,
        context: &RagMultiDocumentContext<T>,
        splitter: &dyn SentenceSplitter,
        similarity: &dyn SimilarityCalculator,
        vectorizer: &dyn SentenceVectorizer,
    ) -> GroundedAnswer {
        let result = context
            .annotate(&self.params.annotation(), splitter, similarity, vectorizer)
            .await;

        let suppressed = result.annotation_coverage < self.min_coverage;
        if suppressed {
            warn!(
                coverage = result.annotation_coverage,
                min_coverage = self.min_coverage,
                "Answer suppressed: too few sentences are grounded in the sources"
            );
        } else {
            info!(
                coverage = result.annotation_coverage,
                citations = result.citations.len(),
                "grounded answer"
            );
        }

        GroundedAnswer { result, suppressed }
    }
}

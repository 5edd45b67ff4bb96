//! Citation annotation and grounding coverage.
//!
//! After a model answers, every sentence of the answer is matched against
//! every embedded source sentence of every retrieved document. Answer
//! sentences whose closest source sentence is similar enough receive an
//! inline `[n]` marker, and each distinct cited source sentence is listed
//! once as a footnote.
//!
//! # Algorithm
//!
//! 1. Split the response into candidate sentences (`min_words` applies).
//!    No candidates means nothing is ungrounded: coverage is `1.0`.
//! 2. Pool the sentences of all individual contexts, in context order.
//! 3. Vectorize all candidates concurrently. For each candidate, keep the
//!    pooled sentence with the highest similarity; ties go to the first
//!    one in pool order. Below `min_similarity`, or when vectorizing the
//!    candidate failed, the candidate stays uncited.
//! 4. In a sequential pass over candidates in response order, assign each
//!    distinct source text an id on first citation, starting at 1.
//! 5. `coverage = cited candidates / candidates`.
//!
//! # Marker placement
//!
//! The ` [n]` marker is inserted directly after the cited sentence text,
//! before its terminating punctuation. Sentences are located left to
//! right, so a sentence repeated in the response gets a marker at each
//! occurrence.

use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::context::RagMultiDocumentContext;
use crate::sentence::SentenceSplitter;
use crate::vector::{SimilarityCalculator, Vector};
use crate::vectorizer::SentenceVectorizer;

/// Thresholds for one annotation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationParams {
    /// Minimum similarity for a citation.
    pub min_similarity: f64,
    /// Minimum words for an answer sentence to be considered.
    pub min_words: usize,
}

/// A source sentence cited at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    /// 1-based, in order of first citation.
    pub id: usize,
    pub source_text: String,
    /// Id of the document the sentence came from.
    pub document_id: Option<String>,
}

/// Outcome of an annotation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationResult {
    /// The response with ` [n]` markers after cited sentences.
    pub annotated_content: String,
    /// One `[n]: source sentence` line per citation, ascending by id.
    pub annotations: String,
    /// Fraction of answer sentences that received a citation, in `[0, 1]`.
    pub annotation_coverage: f64,
    pub citations: Vec<Citation>,
}

impl AnnotationResult {
    /// Annotated content followed by a blank line and the footnotes, or
    /// just the content when nothing was cited.
    pub fn with_footnotes(&self) -> String {
        if self.annotations.is_empty() {
            self.annotated_content.clone()
        } else {
            format!("{}\n\n{}", self.annotated_content, self.annotations)
        }
    }
}

/// One embedded source sentence, flattened out of its document.
struct PooledSentence<'a> {
    text: &'a str,
    vector: &'a Vector,
    document_id: Option<&'a str>,
}

/// Distinct cited source sentences, keyed by exact text.
#[derive(Default)]
struct CitationRegistry {
    ids: HashMap<String, usize>,
    citations: Vec<Citation>,
}

impl CitationRegistry {
    fn cite(&mut self, sentence: &PooledSentence<'_>) -> usize {
        if let Some(id) = self.ids.get(sentence.text) {
            return *id;
        }

        let id = self.citations.len() + 1;
        self.ids.insert(sentence.text.to_string(), id);
        self.citations.push(Citation {
            id,
            source_text: sentence.text.to_string(),
            document_id: sentence.document_id.map(str::to_string),
        });
        id
    }

    fn annotations(&self) -> String {
        self.citations
            .iter()
            .map(|citation| format!("[{}]: {}", citation.id, citation.source_text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<T> RagMultiDocumentContext<T> {
    /// Cite the response against the embedded sentences of every
    /// individual context.
    ///
    /// Never fails: a response sentence that cannot be vectorized is
    /// reported as uncited.
    pub async fn annotate(
        &self,
        params: &AnnotationParams,
        splitter: &dyn SentenceSplitter,
        similarity: &dyn SimilarityCalculator,
        vectorizer: &dyn SentenceVectorizer,
    ) -> AnnotationResult {
        let response = self.response_text();
        let candidates = splitter.split_document(response, params.min_words);

        if candidates.is_empty() {
            return AnnotationResult {
                annotated_content: response.to_string(),
                annotations: String::new(),
                annotation_coverage: 1.0,
                citations: Vec::new(),
            };
        }

        let pool = self.sentence_pool();
        let matches: Vec<Option<&PooledSentence<'_>>> = if pool.is_empty() {
            vec![None; candidates.len()]
        } else {
            let vectorized = join_all(
                candidates
                    .iter()
                    .map(|candidate| vectorizer.vectorize(candidate, None)),
            )
            .await;

            candidates
                .iter()
                .zip(vectorized)
                .map(|(candidate, result)| match result {
                    Ok(sentence) => {
                        closest_sentence(&pool, &sentence.vector, similarity, params.min_similarity)
                    }
                    Err(e) => {
                        warn!(error = %e, sentence = %candidate, "Failed to vectorize answer sentence, leaving it uncited");
                        None
                    }
                })
                .collect()
        };

        let mut registry = CitationRegistry::default();
        let ids: Vec<Option<usize>> = matches
            .iter()
            .map(|matched| matched.map(|sentence| registry.cite(sentence)))
            .collect();

        let cited = ids.iter().filter(|id| id.is_some()).count();
        let annotation_coverage = cited as f64 / candidates.len() as f64;

        debug!(
            candidates = candidates.len(),
            cited,
            sources = pool.len(),
            citations = registry.citations.len(),
            coverage = annotation_coverage,
            "annotated response"
        );

        AnnotationResult {
            annotated_content: insert_markers(response, &candidates, &ids),
            annotations: registry.annotations(),
            annotation_coverage,
            citations: registry.citations,
        }
    }

    fn sentence_pool(&self) -> Vec<PooledSentence<'_>> {
        self.individual_contexts()
            .iter()
            .flat_map(|context| {
                context.sentences().iter().map(move |sentence| PooledSentence {
                    text: &sentence.text,
                    vector: &sentence.vector,
                    document_id: context.id(),
                })
            })
            .collect()
    }
}

/// Best-so-far scan over the pool. Strictly greater scores replace the
/// current best, so the earliest sentence wins a tie.
fn closest_sentence<'p, 'a>(
    pool: &'p [PooledSentence<'a>],
    vector: &Vector,
    similarity: &dyn SimilarityCalculator,
    min_similarity: f64,
) -> Option<&'p PooledSentence<'a>> {
    let mut best: Option<(&PooledSentence<'a>, f64)> = None;

    for sentence in pool {
        let score = similarity.similarity(vector, sentence.vector);
        if score.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((sentence, score));
        }
    }

    best.filter(|(_, score)| *score >= min_similarity)
        .map(|(sentence, _)| sentence)
}

/// Insert ` [id]` after each cited candidate's occurrence in `response`.
fn insert_markers(response: &str, candidates: &[String], ids: &[Option<usize>]) -> String {
    let mut output = String::with_capacity(response.len() + ids.len() * 5);
    let mut cursor = 0;

    for (candidate, id) in candidates.iter().zip(ids) {
        let Some(offset) = response[cursor..].find(candidate.as_str()) else {
            continue;
        };
        let end = cursor + offset + candidate.len();
        output.push_str(&response[cursor..end]);
        if let Some(id) = id {
            output.push_str(&format!(" [{}]", id));
        }
        cursor = end;
    }

    output.push_str(&response[cursor..]);
    output
}

//! Content fingerprints for memoising pure outputs.
//!
//! Trimming and annotation are pure functions of their inputs, so callers
//! may cache their results. These helpers produce the cache keys: SHA-256
//! hex digests over every input that affects the output.
//!
//! Each string field is hashed with a little-endian length prefix so that
//! `["ab", "c"]` and `["a", "bc"]` never collide. Embeddings are hashed as
//! little-endian `f32` bytes.

use sha2::{Digest, Sha256};

use crate::context::RagDocumentContext;
use crate::vector::Vector;

/// Key for [`DocumentTrimmer::trim_document`](crate::trim::DocumentTrimmer::trim_document).
pub fn trim_key(
    document: &str,
    keywords: &[String],
    section_length: usize,
    leading_fraction: f64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"trim");
    write_str(&mut hasher, document);
    write_len(&mut hasher, keywords.len());
    for keyword in keywords {
        write_str(&mut hasher, keyword);
    }
    write_len(&mut hasher, section_length);
    hasher.update(leading_fraction.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Key identifying the embedded sentences of a set of contexts, in order.
pub fn corpus_key<T>(contexts: &[RagDocumentContext<T>]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"corpus");
    write_len(&mut hasher, contexts.len());
    for context in contexts {
        write_str(&mut hasher, context.id().unwrap_or_default());
        write_len(&mut hasher, context.sentences().len());
        for sentence in context.sentences() {
            write_str(&mut hasher, &sentence.text);
            write_vector(&mut hasher, &sentence.vector);
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Key for an annotation pass over `response` against the corpus
/// identified by `corpus_key`.
pub fn annotation_key(
    response: &str,
    corpus_key: &str,
    min_similarity: f64,
    min_words: usize,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"annotation");
    write_str(&mut hasher, response);
    write_str(&mut hasher, corpus_key);
    hasher.update(min_similarity.to_le_bytes());
    write_len(&mut hasher, min_words);
    format!("{:x}", hasher.finalize())
}

fn write_len(hasher: &mut Sha256, len: usize) {
    hasher.update((len as u64).to_le_bytes());
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn write_vector(hasher: &mut Sha256, vector: &Vector) {
    write_len(hasher, vector.dimension());
    for &v in vector.as_slice() {
        hasher.update(v.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::SentenceVector;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_trim_key_deterministic() {
        let a = trim_key("doc", &keywords(&["eks"]), 20, 0.25);
        let b = trim_key("doc", &keywords(&["eks"]), 20, 0.25);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_trim_key_field_boundaries() {
        let a = trim_key("doc", &keywords(&["ab", "c"]), 20, 0.25);
        let b = trim_key("doc", &keywords(&["a", "bc"]), 20, 0.25);
        assert_ne!(a, b);
    }

    #[test]
    fn test_trim_key_sensitive_to_window() {
        let base = trim_key("doc", &keywords(&["eks"]), 20, 0.25);
        assert_ne!(base, trim_key("doc", &keywords(&["eks"]), 21, 0.25));
        assert_ne!(base, trim_key("doc", &keywords(&["eks"]), 20, 0.5));
    }

    #[test]
    fn test_corpus_key_tracks_vectors() {
        let one: Vec<RagDocumentContext<()>> = vec![RagDocumentContext::new(
            "tool",
            "label",
            "doc",
            vec![SentenceVector::new("sentence", vec![1.0, 0.0])],
        )];
        let two: Vec<RagDocumentContext<()>> = vec![RagDocumentContext::new(
            "tool",
            "label",
            "doc",
            vec![SentenceVector::new("sentence", vec![0.0, 1.0])],
        )];
        assert_eq!(corpus_key(&one), corpus_key(&one));
        assert_ne!(corpus_key(&one), corpus_key(&two));
    }

    #[test]
    fn test_corpus_key_ignores_rendered_document() {
        let context: RagDocumentContext<()> = RagDocumentContext::new(
            "tool",
            "label",
            "doc",
            vec![SentenceVector::new("sentence", vec![1.0])],
        );
        let rewritten = context.update_document("summarised doc");
        assert_eq!(
            corpus_key(std::slice::from_ref(&context)),
            corpus_key(std::slice::from_ref(&rewritten))
        );
    }

    #[test]
    fn test_annotation_key() {
        let corpus = corpus_key::<()>(&[]);
        let a = annotation_key("answer", &corpus, 0.8, 3);
        assert_eq!(a, annotation_key("answer", &corpus, 0.8, 3));
        assert_ne!(a, annotation_key("answer", &corpus, 0.7, 3));
        assert_ne!(a, annotation_key("answer", &corpus, 0.8, 4));
        assert_ne!(a, annotation_key("other", &corpus, 0.8, 3));
    }
}

//! Sentence splitter.
//!
//! Splits document text into trimmed sentence strings suitable for
//! embedding. Splitting is boundary-aware rather than "split on every
//! dot": a `.` only ends a sentence when it is followed by whitespace or
//! the end of the text, so `example.png` or `3.14` stay inside their
//! sentence.
//!
//! # Rules
//!
//! 1. Break on `\r\n`, `\r`, `\n`, `;`, and on `.`, `!`, `?` when followed
//!    by whitespace or end of text.
//! 2. Trim each candidate and strip one leading list marker
//!    (`*`, `•`, `◦`, `-`). Numbered markers (`1. `) fall out of rule 1 as
//!    their own single-token sentence.
//! 3. Drop blank candidates and candidates with fewer than `min_words`
//!    whitespace-separated words.
//!
//! # Example
//!
//! ```rust
//! use groundwork_core::sentence::split_sentences;
//!
//! let sentences: Vec<&str> = split_sentences("First one. Second one! Third?", 1).collect();
//! assert_eq!(sentences, vec!["First one", "Second one", "Third"]);
//! ```

use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r\n|\r|\n|\.\s+|\.$|;\s+|;|!\s+|!$|\?\s+|\?$")
        .expect("sentence boundary pattern is valid")
});

/// Split `document` into sentences with at least `min_words` words.
///
/// The returned iterator is lazy and borrows from `document`; calling the
/// function again with the same input yields the same sequence. An empty
/// document yields nothing.
pub fn split_sentences(document: &str, min_words: usize) -> impl Iterator<Item = &str> + '_ {
    SENTENCE_BOUNDARY
        .split(document)
        .map(str::trim)
        .map(strip_list_marker)
        .filter(|sentence| !sentence.is_empty())
        .filter(move |sentence| word_count(sentence) >= min_words)
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Remove a single bullet marker from the start of an already-trimmed
/// candidate. A marker only counts when followed by whitespace, so
/// `-5 degrees` is left alone.
fn strip_list_marker(candidate: &str) -> &str {
    let mut chars = candidate.chars();
    match chars.next() {
        Some('*' | '•' | '◦' | '-') => {
            let rest = chars.as_str();
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                candidate
            }
        }
        _ => candidate,
    }
}

/// Injectable sentence splitting strategy.
pub trait SentenceSplitter: Send + Sync {
    fn split_document(&self, document: &str, min_words: usize) -> Vec<String>;
}

/// [`SentenceSplitter`] backed by [`split_sentences`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSentenceSplitter;

impl SentenceSplitter for SimpleSentenceSplitter {
    fn split_document(&self, document: &str, min_words: usize) -> Vec<String> {
        split_sentences(document, min_words)
            .map(str::to_string)
            .collect()
    }
}

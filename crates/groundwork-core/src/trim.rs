//! Keyword-window document trimmer.
//!
//! Reduces a long document to the regions surrounding occurrences of a set
//! of keywords, so only relevant text is split, embedded and sent to the
//! model.
//!
//! # Algorithm
//!
//! 1. Find every case-insensitive, whole-word occurrence of each keyword.
//!    A match is whole-word when the characters on either side (if any)
//!    are not alphanumeric, so `"eks"` never matches inside `"weeks"`.
//! 2. Turn each occurrence at character `p` into a [`Section`]
//!    `[p - lead, p + trail)` clamped to the document, where `lead` is
//!    `leading_fraction` of the window. The default fraction of `0.25`
//!    keeps more text after a keyword than before it.
//! 3. Merge every group of intersecting sections (overlapping, touching
//!    or nested) into one spanning section carrying the union of their
//!    keywords, until no two sections intersect.
//! 4. Slice the document at each merged section, trim each slice and join
//!    them with a single space.
//!
//! # Totality
//!
//! | Input | Result |
//! |-------|--------|
//! | empty document | [`TrimResult::empty`] |
//! | no keywords, or `section_length == 0` | whole document, no matches |
//! | keywords given but none found | [`TrimResult::empty`] |
//!
//! # Example
//!
//! ```rust
//! use groundwork_core::trim::{DocumentTrimmer, KeywordTrimmer};
//!
//! let doc = "This is a test document. It contains several keywords. This is another sentence with keywords.";
//! let keywords = vec!["test".to_string(), "keywords".to_string()];
//!
//! let result = KeywordTrimmer::default().trim_document(doc, &keywords, 20);
//! assert_eq!(result.document, "is a test document. eral keywords. This with keywords.");
//! assert_eq!(result.keyword_matches, vec!["keywords", "test"]);
//! ```

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Default share of the window placed before a keyword.
pub const DEFAULT_LEADING_FRACTION: f64 = 0.25;

/// A half-open character range `[start, end)` and the keywords that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub start: usize,
    pub end: usize,
    pub keywords: BTreeSet<String>,
}

impl Section {
    pub fn new<I, S>(start: usize, end: usize, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            start,
            end,
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the ranges overlap, touch, or one contains the other.
    pub fn intersects(&self, other: &Section) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Output of a trim: the reduced document and the keywords found in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrimResult {
    pub document: String,
    /// Sorted, deduplicated keywords that matched.
    pub keyword_matches: Vec<String>,
}

impl TrimResult {
    pub fn empty() -> Self {
        Self::default()
    }

    fn pass_through(document: &str) -> Self {
        Self {
            document: document.to_string(),
            keyword_matches: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }
}

/// Injectable trimming strategy.
pub trait DocumentTrimmer: Send + Sync {
    fn trim_document(
        &self,
        document: &str,
        keywords: &[String],
        section_length: usize,
    ) -> TrimResult;
}

/// Trims to exact (case-insensitive, whole-word) keyword occurrences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordTrimmer {
    leading_fraction: f64,
}

impl Default for KeywordTrimmer {
    fn default() -> Self {
        Self {
            leading_fraction: DEFAULT_LEADING_FRACTION,
        }
    }
}

impl KeywordTrimmer {
    /// Create a trimmer placing `leading_fraction` of each window before
    /// the keyword. The fraction is clamped to `[0, 1]`.
    pub fn new(leading_fraction: f64) -> Self {
        let leading_fraction = if leading_fraction.is_nan() {
            DEFAULT_LEADING_FRACTION
        } else {
            leading_fraction.clamp(0.0, 1.0)
        };
        Self { leading_fraction }
    }

    /// A trimmer centring each window on its keyword.
    pub fn symmetric() -> Self {
        Self::new(0.5)
    }

    pub fn leading_fraction(&self) -> f64 {
        self.leading_fraction
    }

    /// Split `section_length` into (characters before, characters after).
    fn window(&self, section_length: usize) -> (usize, usize) {
        let lead = (section_length as f64 * self.leading_fraction).floor() as usize;
        let lead = lead.min(section_length);
        (lead, section_length - lead)
    }

    /// One section per keyword occurrence, in keyword then position order.
    fn keyword_sections(
        &self,
        chars: &[char],
        keywords: &[String],
        section_length: usize,
    ) -> Vec<Section> {
        let folded: Vec<char> = chars.iter().map(|c| fold(*c)).collect();
        let (lead, trail) = self.window(section_length);
        let mut sections = Vec::new();

        for keyword in keywords {
            if keyword.trim().is_empty() {
                continue;
            }
            let needle: Vec<char> = keyword.chars().map(fold).collect();
            for position in keyword_positions(&folded, &needle) {
                sections.push(Section::new(
                    position.saturating_sub(lead),
                    (position + trail).min(chars.len()),
                    [keyword.as_str()],
                ));
            }
        }

        sections
    }
}

impl DocumentTrimmer for KeywordTrimmer {
    fn trim_document(
        &self,
        document: &str,
        keywords: &[String],
        section_length: usize,
    ) -> TrimResult {
        if document.is_empty() {
            return TrimResult::empty();
        }

        if keywords.is_empty() || section_length == 0 {
            return TrimResult::pass_through(document);
        }

        let chars: Vec<char> = document.chars().collect();
        let sections = merge_sections(self.keyword_sections(&chars, keywords, section_length));

        if sections.is_empty() {
            debug!(keywords = keywords.len(), "no keyword occurrences found");
            return TrimResult::empty();
        }

        // Byte offset of every char boundary, plus the end of the string.
        let offsets: Vec<usize> = document
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(document.len()))
            .collect();

        let trimmed = sections
            .iter()
            .map(|section| document[offsets[section.start]..offsets[section.end]].trim())
            .collect::<Vec<_>>()
            .join(" ");

        let keyword_matches: BTreeSet<&String> =
            sections.iter().flat_map(|s| s.keywords.iter()).collect();

        debug!(
            sections = sections.len(),
            original_chars = chars.len(),
            trimmed_chars = trimmed.chars().count(),
            "trimmed document to keywords"
        );

        TrimResult {
            document: trimmed,
            keyword_matches: keyword_matches.into_iter().cloned().collect(),
        }
    }
}

/// Merge intersecting sections.
///
/// The result contains no two intersecting sections, is sorted by
/// `start`, and does not depend on input order. Sorting first lets a
/// single sweep reach the same fixed point as repeatedly merging groups.
pub fn merge_sections(mut sections: Vec<Section>) -> Vec<Section> {
    sections.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut merged: Vec<Section> = Vec::with_capacity(sections.len());
    for section in sections {
        match merged.last_mut() {
            Some(current) if current.intersects(&section) => {
                current.end = current.end.max(section.end);
                current.keywords.extend(section.keywords);
            }
            _ => merged.push(section),
        }
    }

    merged
}

/// True when `keyword` at character `position` of `document` is not
/// embedded in a longer alphanumeric run.
pub fn is_whole_word(document: &str, keyword: &str, position: usize) -> bool {
    let chars: Vec<char> = document.chars().collect();
    whole_word_at(&chars, position, keyword.chars().count())
}

fn whole_word_at(chars: &[char], position: usize, len: usize) -> bool {
    let before_ok = match position.checked_sub(1) {
        Some(before) => !chars.get(before).is_some_and(|c| c.is_alphanumeric()),
        None => true,
    };
    let after_ok = !chars
        .get(position + len)
        .is_some_and(|c| c.is_alphanumeric());
    before_ok && after_ok
}

/// Character positions of every whole-word occurrence of `needle`.
/// Occurrences may overlap.
fn keyword_positions(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }

    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(position, _)| position)
        .filter(|position| whole_word_at(haystack, *position, needle.len()))
        .collect()
}

/// Single-char lowercase fold; keeps character positions aligned with the
/// original document.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

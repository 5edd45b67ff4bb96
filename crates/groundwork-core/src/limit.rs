//! Character-budget list limiter.
//!
//! Bounds the amount of context sent to a model. Items are kept in order
//! until the running character count would exceed the budget; that item
//! and everything after it is dropped. This is a strict prefix cut, not a
//! best-fit packing: a short item after an oversized one is still dropped.
//!
//! Results are returned as sub-slices of the input, so the output is a
//! prefix by construction.
//!
//! # Example
//!
//! ```rust
//! use groundwork_core::limit::ListLimiter;
//!
//! let items = ["aaaa", "bbbb", "c"];
//! assert_eq!(ListLimiter::new(9).limit(&items), &["aaaa", "bbbb", "c"]);
//! assert_eq!(ListLimiter::new(8).limit(&items), &["aaaa", "bbbb"]);
//! assert!(ListLimiter::new(0).limit(&items).is_empty());
//! ```

use crate::context::RagDocumentContext;

/// Prefix limiter with a character budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimiter {
    max_chars: usize,
}

impl ListLimiter {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Limit a list of strings.
    pub fn limit<'a, S: AsRef<str>>(&self, items: &'a [S]) -> &'a [S] {
        self.limit_by(items, |item| item.as_ref())
    }

    /// Limit arbitrary items, measuring the string `measure` projects.
    pub fn limit_by<'a, T, F>(&self, items: &'a [T], measure: F) -> &'a [T]
    where
        F: Fn(&T) -> &str,
    {
        if self.max_chars == 0 {
            return &items[..0];
        }

        let mut total = 0usize;
        for (index, item) in items.iter().enumerate() {
            total += measure(item).chars().count();
            if total > self.max_chars {
                return &items[..index];
            }
        }

        items
    }

    /// Limit `(key, context)` pairs by each context's document.
    pub fn limit_contexts<'a, K, T>(
        &self,
        items: &'a [(K, RagDocumentContext<T>)],
    ) -> &'a [(K, RagDocumentContext<T>)] {
        self.limit_by(items, |(_, context)| context.document())
    }
}

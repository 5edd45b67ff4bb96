//! Hooks applied to retrieved contexts before they are sent to a model.

use groundwork_core::context::RagDocumentContext;
use groundwork_core::limit::ListLimiter;
use tracing::debug;

/// Keep the longest prefix of `contexts` whose documents fit in
/// `max_chars` characters. `0` disables the limit.
pub fn limit_context_size<T>(
    contexts: &[RagDocumentContext<T>],
    max_chars: usize,
) -> &[RagDocumentContext<T>] {
    if max_chars == 0 {
        return contexts;
    }

    let limited = ListLimiter::new(max_chars).limit_by(contexts, RagDocumentContext::document);
    if limited.len() < contexts.len() {
        debug!(
            kept = limited.len(),
            dropped = contexts.len() - limited.len(),
            max_chars,
            "limited context size"
        );
    }
    limited
}

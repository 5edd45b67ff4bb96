//! Source item → document context pipeline.
//!
//! ```text
//! SourceItem.body ─▶ trim to keywords ─▶ split sentences ─▶ vectorize ─▶ RagDocumentContext
//! ```
//!
//! Vectorization is allowed to fail: the context is still built, without
//! sentences, and a warning is logged. Such a context can be sent to the
//! model but never cited.

use futures::future::join_all;
use groundwork_core::context::RagDocumentContext;
use groundwork_core::keywords::parse_keyword_list;
use groundwork_core::params::RetrievalParams;
use groundwork_core::sentence::{SentenceSplitter, SimpleSentenceSplitter};
use groundwork_core::trim::{DocumentTrimmer, TrimResult};
use groundwork_core::vectorizer::{SentenceVector, SentenceVectorizer};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::SourceItem;

/// Per-request keyword arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordArgs {
    pub keywords: Vec<String>,
    /// Characters per keyword section for this request; `None` uses the
    /// configured window. `Some(0)` disables trimming.
    pub keyword_window: Option<usize>,
    /// Hidden text passed to the vectorizer, usually the entity the
    /// documents are about.
    pub entity: Option<String>,
}

impl KeywordArgs {
    pub fn parse(
        keywords: Option<&str>,
        keyword_window: Option<usize>,
        entity: Option<&str>,
    ) -> Self {
        Self {
            keywords: parse_keyword_list(keywords),
            keyword_window,
            entity: entity
                .map(str::trim)
                .filter(|entity| !entity.is_empty())
                .map(str::to_string),
        }
    }
}

/// Builds [`RagDocumentContext`]s from [`SourceItem`]s.
pub struct ContextBuilder {
    source_min_words: usize,
    keyword_window: usize,
    trimmer: Arc<dyn DocumentTrimmer>,
    splitter: Arc<dyn SentenceSplitter>,
    vectorizer: Arc<dyn SentenceVectorizer>,
}

impl ContextBuilder {
    pub fn new(params: &RetrievalParams, vectorizer: Arc<dyn SentenceVectorizer>) -> Self {
        Self {
            source_min_words: params.source_min_words,
            keyword_window: params.keyword_window,
            trimmer: Arc::new(params.trimmer()),
            splitter: Arc::new(SimpleSentenceSplitter),
            vectorizer,
        }
    }

    pub fn with_trimmer(mut self, trimmer: Arc<dyn DocumentTrimmer>) -> Self {
        self.trimmer = trimmer;
        self
    }

    pub fn with_splitter(mut self, splitter: Arc<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    /// A citable context: the trimmed body, the item's id, a markdown link
    /// and the matched keywords.
    pub async fn document_context(
        &self,
        item: &SourceItem,
        tool: &str,
        context_label: &str,
        args: &KeywordArgs,
    ) -> RagDocumentContext<SourceItem> {
        let trimmed = self.trim(&item.body, args);
        let sentences = self.vectorize(&trimmed.document, args, &item.id).await;

        let context = RagDocumentContext::new(tool, context_label, trimmed.document, sentences)
            .with_id(item.id.clone())
            .with_source(item.clone())
            .with_keyword_matches(trimmed.keyword_matches)
            .with_metadata(item.metadata.clone());

        match item.markdown_link() {
            Some(link) => context.with_link(link),
            None => context,
        }
    }

    /// A context without identity: the full body is sent to the model,
    /// while the embedded sentences come from the trimmed text.
    pub async fn unlinked_context(
        &self,
        item: &SourceItem,
        tool: &str,
        context_label: &str,
        args: &KeywordArgs,
    ) -> RagDocumentContext<SourceItem> {
        let trimmed = self.trim(&item.body, args);
        let sentences = self.vectorize(&trimmed.document, args, &item.id).await;

        RagDocumentContext::new(tool, context_label, item.body.clone(), sentences)
            .with_keyword_matches(trimmed.keyword_matches)
    }

    /// [`Self::document_context`] for every item, concurrently, in input
    /// order.
    pub async fn document_contexts(
        &self,
        items: &[SourceItem],
        tool: &str,
        context_label: &str,
        args: &KeywordArgs,
    ) -> Vec<RagDocumentContext<SourceItem>> {
        join_all(
            items
                .iter()
                .map(|item| self.document_context(item, tool, context_label, args)),
        )
        .await
    }

    fn trim(&self, body: &str, args: &KeywordArgs) -> TrimResult {
        let window = args.keyword_window.unwrap_or(self.keyword_window);
        self.trimmer.trim_document(body, &args.keywords, window)
    }

    async fn vectorize(&self, document: &str, args: &KeywordArgs, id: &str) -> Vec<SentenceVector> {
        let sentences = self.splitter.split_document(document, self.source_min_words);
        if sentences.is_empty() {
            return Vec::new();
        }

        match self
            .vectorizer
            .vectorize_all(&sentences, args.entity.as_deref())
            .await
        {
            Ok(vectors) => {
                debug!(id, sentences = vectors.len(), "vectorized document");
                vectors
            }
            Err(e) => {
                warn!(id, error = %e, "Failed to vectorize sentences, continuing without vectors");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{DisabledProvider, HashingProvider, ProviderVectorizer};

    const BODY: &str = "The platform team moved every service to EKS last spring after a long review. \
        Costs went down noticeably once the old cluster was retired for good. \
        Nobody on the support rotation misses the weekly manual patching either.";

    fn params() -> RetrievalParams {
        RetrievalParams {
            source_min_words: 5,
            ..RetrievalParams::default()
        }
    }

    fn hashing_builder() -> ContextBuilder {
        let provider = Arc::new(HashingProvider::new("hashing-v1", 64).unwrap());
        ContextBuilder::new(&params(), Arc::new(ProviderVectorizer::new(provider, 4)))
    }

    fn item() -> SourceItem {
        SourceItem::new("wiki", "page-7", BODY)
            .with_url("https://wiki.example.com/7")
            .with_link_text("Migration notes")
    }

    #[test]
    fn test_keyword_args_parse() {
        let args = KeywordArgs::parse(Some("eks, costs ,"), Some(120), Some("  "));
        assert_eq!(args.keywords, vec!["eks", "costs"]);
        assert_eq!(args.keyword_window, Some(120));
        assert_eq!(args.entity, None);

        let args = KeywordArgs::parse(None, None, Some("Acme"));
        assert!(args.keywords.is_empty());
        assert_eq!(args.keyword_window, None);
        assert_eq!(args.entity.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_document_context_without_keywords() {
        let context = hashing_builder()
            .document_context(&item(), "wiki", "Wiki page", &KeywordArgs::default())
            .await;

        assert_eq!(context.document(), BODY);
        assert_eq!(context.id(), Some("page-7"));
        assert_eq!(context.link(), Some("[Migration notes](https://wiki.example.com/7)"));
        assert_eq!(context.sentences().len(), 3);
        assert_eq!(context.source().map(|s| s.id.as_str()), Some("page-7"));
        assert!(context.keyword_matches().is_empty());
    }

    #[tokio::test]
    async fn test_document_context_trims_to_keywords() {
        let args = KeywordArgs::parse(Some("EKS"), Some(40), None);
        let context = hashing_builder()
            .document_context(&item(), "wiki", "Wiki page", &args)
            .await;

        assert!(context.document().contains("EKS"));
        assert!(context.document().chars().count() <= 40);
        assert_eq!(context.keyword_matches(), &["EKS"]);
    }

    #[tokio::test]
    async fn test_document_context_no_keyword_match() {
        let args = KeywordArgs::parse(Some("kubernetes"), Some(40), None);
        let context = hashing_builder()
            .document_context(&item(), "wiki", "Wiki page", &args)
            .await;

        assert_eq!(context.document(), "");
        assert!(!context.is_vectorized());
    }

    #[tokio::test]
    async fn test_configured_window_applies_without_override() {
        let config = crate::config::parse_config(
            "[retrieval]\nkeyword_window = 40\nsource_min_words = 5\n",
        )
        .unwrap();
        let provider = Arc::new(HashingProvider::new("hashing-v1", 64).unwrap());
        let builder = ContextBuilder::new(
            &config.retrieval.params(),
            Arc::new(ProviderVectorizer::new(provider, 4)),
        );

        let args = KeywordArgs {
            keywords: vec!["EKS".to_string()],
            ..KeywordArgs::default()
        };
        let context = builder
            .document_context(&item(), "wiki", "Wiki page", &args)
            .await;
        assert!(context.document().contains("EKS"));
        assert!(context.document().chars().count() <= 40);
        assert_eq!(context.keyword_matches(), &["EKS"]);

        let untrimmed = KeywordArgs {
            keyword_window: Some(0),
            ..args
        };
        let context = builder
            .document_context(&item(), "wiki", "Wiki page", &untrimmed)
            .await;
        assert_eq!(context.document(), BODY);
    }

    #[tokio::test]
    async fn test_vectorizer_failure_falls_back() {
        let builder = ContextBuilder::new(
            &params(),
            Arc::new(ProviderVectorizer::new(Arc::new(DisabledProvider), 1)),
        );
        let context = builder
            .document_context(&item(), "wiki", "Wiki page", &KeywordArgs::default())
            .await;

        assert_eq!(context.document(), BODY);
        assert!(!context.is_vectorized());
        assert_eq!(context.id(), Some("page-7"));
    }

    #[tokio::test]
    async fn test_unlinked_context_keeps_full_body() {
        let args = KeywordArgs::parse(Some("EKS"), Some(80), None);
        let context = hashing_builder()
            .unlinked_context(&item(), "wiki", "Wiki page", &args)
            .await;

        assert_eq!(context.document(), BODY);
        assert_eq!(context.id(), None);
        assert_eq!(context.link(), None);
        assert_eq!(context.keyword_matches(), &["EKS"]);
        assert!(context.sentences().iter().all(|s| BODY.contains(&s.text)));
    }

    #[tokio::test]
    async fn test_document_contexts_preserve_order() {
        let items: Vec<SourceItem> = (0..5)
            .map(|i| SourceItem::new("wiki", format!("page-{i}"), BODY))
            .collect();
        let contexts = hashing_builder()
            .document_contexts(&items, "wiki", "Wiki page", &KeywordArgs::default())
            .await;

        let ids: Vec<&str> = contexts.iter().filter_map(|c| c.id()).collect();
        assert_eq!(ids, vec!["page-0", "page-1", "page-2", "page-3", "page-4"]);
        assert!(contexts.iter().all(|c| c.link().is_none()));
    }
}

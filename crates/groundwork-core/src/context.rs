//! RAG document contexts.
//!
//! A [`RagDocumentContext`] captures one retrieved item: the text sent to
//! the model, the embedded sentences it was built from, and the identity
//! and link metadata needed to cite it. A [`RagMultiDocumentContext`]
//! aggregates many of them together with the prompt and, once the model
//! has answered, the response text.
//!
//! Both types are immutable values. Every `update_*`/`with_*` operation
//! returns a new value; embedded sentences and individual contexts are
//! shared behind an [`Arc`] so updates never copy them.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::vectorizer::SentenceVector;

/// A single retrieved document and its embedded sentences.
///
/// `T` is the source item the document was built from (a ticket, a
/// message thread, a web page...).
#[derive(Debug, Clone, Serialize)]
pub struct RagDocumentContext<T> {
    tool: String,
    context_label: String,
    document: String,
    sentences: Arc<[SentenceVector]>,
    id: Option<String>,
    source: Option<T>,
    link: Option<String>,
    keyword_matches: Vec<String>,
    metadata: Map<String, Value>,
}

impl<T> RagDocumentContext<T> {
    pub fn new(
        tool: impl Into<String>,
        context_label: impl Into<String>,
        document: impl Into<String>,
        sentences: Vec<SentenceVector>,
    ) -> Self {
        Self {
            tool: tool.into(),
            context_label: context_label.into(),
            document: document.into(),
            sentences: sentences.into(),
            id: None,
            source: None,
            link: None,
            keyword_matches: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_source(mut self, source: T) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_keyword_matches(mut self, keyword_matches: Vec<String>) -> Self {
        self.keyword_matches = keyword_matches;
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Name of the tool that retrieved this document.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Human-readable label used when presenting the document to a model.
    pub fn context_label(&self) -> &str {
        &self.context_label
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn sentences(&self) -> &[SentenceVector] {
        &self.sentences
    }

    /// False when the document was built without embeddings, for example
    /// after the vectorizer failed. Such a document can still be sent to a
    /// model but can never be cited.
    pub fn is_vectorized(&self) -> bool {
        !self.sentences.is_empty()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn source(&self) -> Option<&T> {
        self.source.as_ref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn keyword_matches(&self) -> &[String] {
        &self.keyword_matches
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// First `length` characters of the document.
    pub fn document_left(&self, length: usize) -> &str {
        match self.document.char_indices().nth(length) {
            Some((end, _)) => &self.document[..end],
            None => &self.document,
        }
    }

    /// Last `length` characters of the document.
    pub fn document_right(&self, length: usize) -> &str {
        if length == 0 {
            return "";
        }
        match self.document.char_indices().rev().nth(length - 1) {
            Some((start, _)) => &self.document[start..],
            None => &self.document,
        }
    }
}

impl<T: Clone> RagDocumentContext<T> {
    /// Replace the document text (after sanitising, templating or
    /// summarising it) while keeping the original embedded sentences, so
    /// answers can still be traced to the source.
    pub fn update_document(&self, document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            ..self.clone()
        }
    }
}

/// Many documents plus the prompt and the model's answer.
#[derive(Debug, Serialize)]
pub struct RagMultiDocumentContext<T> {
    prompt: String,
    instructions: String,
    individual_contexts: Arc<[RagDocumentContext<T>]>,
    response_text: String,
}

impl<T> Clone for RagMultiDocumentContext<T> {
    fn clone(&self) -> Self {
        Self {
            prompt: self.prompt.clone(),
            instructions: self.instructions.clone(),
            individual_contexts: Arc::clone(&self.individual_contexts),
            response_text: self.response_text.clone(),
        }
    }
}

impl<T> RagMultiDocumentContext<T> {
    pub fn new(
        prompt: impl Into<String>,
        instructions: impl Into<String>,
        individual_contexts: Vec<RagDocumentContext<T>>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            instructions: instructions.into(),
            individual_contexts: individual_contexts.into(),
            response_text: String::new(),
        }
    }

    /// Return a copy carrying the model's answer. The individual contexts
    /// are shared, not copied.
    pub fn update_response(&self, response_text: impl Into<String>) -> Self {
        Self {
            response_text: response_text.into(),
            ..self.clone()
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn individual_contexts(&self) -> &[RagDocumentContext<T>] {
        &self.individual_contexts
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    /// The context block sent to the model: each document under its label,
    /// separated by blank lines.
    pub fn combined_document(&self) -> String {
        self.individual_contexts
            .iter()
            .map(|context| {
                if context.context_label().is_empty() {
                    context.document().to_string()
                } else {
                    format!("{}:\n{}", context.context_label(), context.document())
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn ids(&self) -> Vec<&str> {
        self.individual_contexts
            .iter()
            .filter_map(RagDocumentContext::id)
            .collect()
    }

    pub fn links(&self) -> Vec<&str> {
        self.individual_contexts
            .iter()
            .filter_map(RagDocumentContext::link)
            .collect()
    }

    pub fn sources(&self) -> Vec<&T> {
        self.individual_contexts
            .iter()
            .filter_map(RagDocumentContext::source)
            .collect()
    }

    /// Sorted union of every document's keyword matches.
    pub fn keyword_matches(&self) -> Vec<String> {
        self.individual_contexts
            .iter()
            .flat_map(|context| context.keyword_matches().iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

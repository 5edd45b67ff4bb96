//! Data models for retrieved items.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw item produced by a retrieval tool before it becomes a document
/// context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Tool or system the item came from (e.g. `"zendesk"`).
    pub source: String,
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub link_text: Option<String>,
    pub body: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SourceItem {
    pub fn new(source: impl Into<String>, id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            id: id.into(),
            url: None,
            link_text: None,
            body: body.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_link_text(mut self, link_text: impl Into<String>) -> Self {
        self.link_text = Some(link_text.into());
        self
    }

    /// Markdown link to the item, using the id when there is no link text.
    /// `None` without a URL.
    pub fn markdown_link(&self) -> Option<String> {
        let url = self.url.as_deref()?;
        let text = self.link_text.as_deref().unwrap_or(&self.id);
        Some(format!("[{}]({})", text, url))
    }
}

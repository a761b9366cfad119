//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// A curated knowledge entry from the static corpus.
///
/// The title identifies the entry; the content is what gets embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Short headline, rendered in bold above the content
    pub title: String,

    /// Body text
    pub content: String,
}

impl KnowledgeEntry {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A knowledge entry returned by a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedEntry {
    pub title: String,
    pub content: String,

    /// Cosine similarity to the query, in [-1, 1]
    pub score: f32,
}

impl RetrievedEntry {
    /// Render as a titled snippet block.
    pub fn render(&self) -> String {
        format!("**{}**\n{}", self.title, self.content)
    }
}

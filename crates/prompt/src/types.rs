//! Prompt types for the Retention Copilot.

use serde::{Deserialize, Serialize};

/// Evidence gathered for a single question.
///
/// A question is answered from exactly one evidence path, so the two kinds
/// are alternatives rather than optional fields side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Evidence {
    /// Rendered result table (or status message) from the subscriber store
    Sql(String),

    /// Titled knowledge blocks from semantic retrieval
    Retrieval(String),
}

impl Evidence {
    /// The evidence text, whichever path produced it.
    pub fn text(&self) -> &str {
        match self {
            Evidence::Sql(text) | Evidence::Retrieval(text) => text,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Evidence::Sql(_) => "sql",
            Evidence::Retrieval(_) => "retrieval",
        }
    }
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Complete prompt text, role statement included
    pub text: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Whether a retrieved-knowledge section was rendered
    #[serde(rename = "knowledgeIncluded")]
    pub knowledge_included: bool,

    /// Whether an SQL-results section was rendered
    #[serde(rename = "sqlIncluded")]
    pub sql_included: bool,

    /// Length of the rendered prompt in characters
    #[serde(rename = "promptChars")]
    pub prompt_chars: usize,
}

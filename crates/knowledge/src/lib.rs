//! Knowledge retrieval for the Retention Copilot.
//!
//! Loads the static knowledge corpus, embeds it once into an in-memory
//! [`SemanticIndex`], and serves top-K titled snippets through [`Retriever`].

pub mod corpus;
pub mod embeddings;
pub mod index;
pub mod retriever;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use corpus::load_corpus;
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::SemanticIndex;
pub use retriever::{render_snippets, Retriever, DEFAULT_TOP_K, NO_KNOWLEDGE_MESSAGE};
pub use types::{KnowledgeEntry, RetrievedEntry};

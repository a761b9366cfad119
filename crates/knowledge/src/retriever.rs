//! Retrieval evidence gathering.

use crate::corpus::load_corpus;
use crate::embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
use crate::index::SemanticIndex;
use crate::types::{KnowledgeEntry, RetrievedEntry};
use copilot_core::AppResult;
use std::path::Path;
use std::sync::Arc;

/// Returned when the search yields nothing to cite.
pub const NO_KNOWLEDGE_MESSAGE: &str = "No relevant knowledge found.";

/// Separator placed between rendered snippets.
pub const SNIPPET_SEPARATOR: &str = "\n\n---\n\n";

/// Default retrieval fan-out.
pub const DEFAULT_TOP_K: usize = 3;

/// Turns a question into titled knowledge snippets.
///
/// Owns the index and the provider that built it, so queries are always
/// embedded in the same space as the corpus.
#[derive(Debug, Clone)]
pub struct Retriever {
    index: Arc<SemanticIndex>,
    provider: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: SemanticIndex, provider: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self {
            index: Arc::new(index),
            provider,
            top_k,
        }
    }

    /// Embed `entries` with `provider` and wrap the resulting index.
    pub async fn build(
        entries: Vec<KnowledgeEntry>,
        provider: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> AppResult<Self> {
        let index = SemanticIndex::build(entries, provider.as_ref()).await?;
        Ok(Self::new(index, provider, top_k))
    }

    /// Load the corpus from disk and build the index with the configured provider.
    pub async fn from_corpus(
        path: &Path,
        config: &EmbeddingConfig,
        top_k: usize,
    ) -> AppResult<Self> {
        let entries = load_corpus(path)?;
        let provider = create_provider(config)?;
        Self::build(entries, provider, top_k).await
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &SemanticIndex {
        &self.index
    }

    /// Top-K entries for `question`, best first.
    pub async fn search(&self, question: &str) -> AppResult<Vec<RetrievedEntry>> {
        let query = self.provider.embed(question).await?;
        Ok(self.index.search(&query, self.top_k))
    }

    /// Gather retrieval evidence as text.
    ///
    /// Never fails: an embedding error is reported inside the returned text.
    pub async fn retrieve(&self, question: &str) -> String {
        match self.search(question).await {
            Ok(hits) => {
                tracing::info!("Retrieved {} knowledge entries", hits.len());
                render_snippets(&hits)
            }
            Err(e) => {
                tracing::error!("Knowledge retrieval failed: {}", e);
                format!("Knowledge retrieval error: {}", e)
            }
        }
    }
}

/// Join hits as `**title**\ncontent` blocks, or the no-knowledge message.
pub fn render_snippets(hits: &[RetrievedEntry]) -> String {
    if hits.is_empty() {
        return NO_KNOWLEDGE_MESSAGE.to_string();
    }

    hits.iter()
        .map(RetrievedEntry::render)
        .collect::<Vec<_>>()
        .join(SNIPPET_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use copilot_core::AppError;

    /// Provider whose every call fails.
    #[derive(Debug)]
    struct BrokenProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for BrokenProvider {
        fn provider_name(&self) -> &str {
            "broken"
        }

        fn model_name(&self) -> &str {
            "none"
        }

        fn dimensions(&self) -> usize {
            8
        }

        async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Err(AppError::Knowledge("embedding backend offline".to_string()))
        }
    }

    fn corpus() -> Vec<KnowledgeEntry> {
        vec![
            KnowledgeEntry::new(
                "Segment Analysis Overview",
                "Early High-Risk subscribers show 58% churn probability in their first months.",
            ),
            KnowledgeEntry::new(
                "Retention Strategies",
                "Retention strategies for at-risk customers: loyalty bundles, contract upgrades.",
            ),
            KnowledgeEntry::new(
                "Pricing Sensitivity",
                "Subscribers paying above 75 per month respond to targeted discount offers.",
            ),
            KnowledgeEntry::new(
                "Network Quality",
                "Dropped calls and coverage gaps increase complaints.",
            ),
        ]
    }

    async fn retriever(top_k: usize) -> Retriever {
        Retriever::build(corpus(), Arc::new(TrigramProvider::new(384)), top_k)
            .await
            .unwrap()
    }

    #[test]
    fn test_render_empty_hits() {
        assert_eq!(render_snippets(&[]), NO_KNOWLEDGE_MESSAGE);
    }

    #[tokio::test]
    async fn test_retrieve_returns_top_k_titled_blocks() {
        let retriever = retriever(3).await;
        let text = retriever
            .retrieve("What retention strategies work for at-risk customers?")
            .await;

        let blocks: Vec<&str> = text.split(SNIPPET_SEPARATOR).collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].starts_with("**Retention Strategies**\n"));
        for block in blocks {
            assert!(block.starts_with("**"));
        }
    }

    #[tokio::test]
    async fn test_retrieve_is_deterministic() {
        let retriever = retriever(3).await;
        let question = "Why do early subscribers churn?";

        let first = retriever.retrieve(question).await;
        let second = retriever.retrieve(question).await;
        let rebuilt = self::retriever(3).await.retrieve(question).await;

        assert_eq!(first, second);
        assert_eq!(first, rebuilt);
    }

    #[tokio::test]
    async fn test_top_k_larger_than_corpus() {
        let retriever = retriever(10).await;
        let hits = retriever.search("churn").await.unwrap();
        assert_eq!(hits.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_corpus_yields_message() {
        let retriever = Retriever::build(Vec::new(), Arc::new(TrigramProvider::new(384)), 3)
            .await
            .unwrap();
        assert!(retriever.index().is_empty());
        assert_eq!(retriever.retrieve("anything").await, NO_KNOWLEDGE_MESSAGE);
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_text() {
        let index = SemanticIndex::build(Vec::new(), &TrigramProvider::new(8))
            .await
            .unwrap();
        let retriever = Retriever::new(index, Arc::new(BrokenProvider), 3);

        let text = retriever.retrieve("churn").await;
        assert!(text.starts_with("Knowledge retrieval error:"));
        assert!(text.contains("embedding backend offline"));
    }
}

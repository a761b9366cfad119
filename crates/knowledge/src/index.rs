//! In-memory semantic index over the knowledge corpus.

use crate::embeddings::EmbeddingProvider;
use crate::types::{KnowledgeEntry, RetrievedEntry};
use copilot_core::{AppError, AppResult};
use std::cmp::Ordering;

/// Exact nearest-neighbour index, built once and read-only afterwards.
///
/// Every search scores all entries, so results are exact and deterministic.
/// Equal scores keep corpus order.
#[derive(Debug, Clone)]
pub struct SemanticIndex {
    entries: Vec<KnowledgeEntry>,
    vectors: Vec<Vec<f32>>,
}

impl SemanticIndex {
    /// Embed every entry's content and build the index.
    pub async fn build(
        entries: Vec<KnowledgeEntry>,
        provider: &dyn EmbeddingProvider,
    ) -> AppResult<Self> {
        let texts: Vec<String> = entries.iter().map(|e| e.content.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;

        if vectors.len() != entries.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} entries",
                vectors.len(),
                entries.len()
            )));
        }

        tracing::info!(
            "Built semantic index: {} entries, {} ({}, {} dims)",
            entries.len(),
            provider.provider_name(),
            provider.model_name(),
            provider.dimensions()
        );

        Ok(Self { entries, vectors })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-`k` entries by cosine similarity to `query`, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<RetrievedEntry> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(query, v)))
            .collect();

        // Stable sort: ties stay in corpus order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        tracing::debug!(
            "Semantic search scores (top-{}): {:?}",
            k,
            scored.iter().map(|(_, s)| *s).collect::<Vec<_>>()
        );

        scored
            .into_iter()
            .map(|(i, score)| RetrievedEntry {
                title: self.entries[i].title.clone(),
                content: self.entries[i].content.clone(),
                score,
            })
            .collect()
    }
}

/// Calculate cosine similarity between two vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

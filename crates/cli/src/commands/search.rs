//! Search command handler.
//!
//! Queries the knowledge index directly, without routing or generation.

use super::print_json;
use clap::Args;
use copilot_core::{config::AppConfig, AppError, AppResult};
use copilot_knowledge::{render_snippets, EmbeddingConfig, Retriever};

/// Search the knowledge corpus
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Search query
    pub query: String,

    /// Number of entries to return (defaults to the configured top-k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output hits with scores as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let top_k = self.top_k.unwrap_or(config.top_k);
        if top_k == 0 {
            return Err(AppError::Config("--top-k must be at least 1".to_string()));
        }

        let retriever = Retriever::from_corpus(
            &config.knowledge_file(),
            &EmbeddingConfig::from_app_config(config),
            top_k,
        )
        .await?;

        let hits = retriever.search(&self.query).await?;
        tracing::debug!("Search returned {} hits", hits.len());

        if self.json {
            return print_json(&hits);
        }

        println!("{}", render_snippets(&hits));
        Ok(())
    }
}

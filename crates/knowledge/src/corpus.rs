//! Static knowledge corpus loading.

use crate::types::KnowledgeEntry;
use copilot_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Load the knowledge corpus: a JSON array of `{ "title", "content" }` objects.
///
/// A missing or malformed file is fatal; the retriever cannot be built
/// without it. Entry order is preserved and breaks similarity ties.
pub fn load_corpus(path: &Path) -> AppResult<Vec<KnowledgeEntry>> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Knowledge(format!(
            "Failed to read knowledge corpus at {:?}: {}",
            path, e
        ))
    })?;

    let entries: Vec<KnowledgeEntry> = serde_json::from_str(&content).map_err(|e| {
        AppError::Knowledge(format!(
            "Failed to parse knowledge corpus at {:?}: {}",
            path, e
        ))
    })?;

    tracing::debug!("Loaded {} knowledge entries from {:?}", entries.len(), path);
    Ok(entries)
}

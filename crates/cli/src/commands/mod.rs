//! Command handlers for the copilot CLI.

pub mod ask;
pub mod route;
pub mod search;
pub mod seed;

pub use ask::AskCommand;
pub use route::RouteCommand;
pub use search::SearchCommand;
pub use seed::SeedCommand;

use copilot_core::{AppError, AppResult};
use std::path::PathBuf;

/// Question text from the positional argument or a file.
pub(crate) fn read_question(question: Option<&str>, file: Option<&PathBuf>) -> AppResult<String> {
    let text = match (question, file) {
        (Some(q), _) => q.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err(AppError::Config("No question provided".to_string())),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Config("Question is empty".to_string()));
    }
    Ok(text.to_string())
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

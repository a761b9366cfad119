//! Error types for the Retention Copilot.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! remote generation, retrieval, SQL, and prompt failures.

use thiserror::Error;

/// Unified error type for the Retention Copilot.
///
/// Evidence gathering degrades to informative text instead of returning these;
/// the variants mostly surface from startup (configuration, corpus loading)
/// and from the remote generation boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote generation or classification errors (non-transient)
    #[error("LLM error: {0}")]
    Llm(String),

    /// The remote service rejected the call for quota reasons (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// A caller cancelled the operation between attempts
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Knowledge corpus, embedding, and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Relational store errors
    #[error("SQL error: {0}")]
    Sql(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error is a transient quota rejection worth retrying.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::RateLimited(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_classification() {
        assert!(AppError::RateLimited("quota".to_string()).is_rate_limited());
        assert!(!AppError::Llm("bad request".to_string()).is_rate_limited());
        assert!(!AppError::Cancelled("stop".to_string()).is_rate_limited());
    }

    #[test]
    fn test_display_prefixes() {
        let err = AppError::RateLimited("429 RESOURCE_EXHAUSTED".to_string());
        assert_eq!(err.to_string(), "Rate limited: 429 RESOURCE_EXHAUSTED");

        let err = AppError::Sql("no such table".to_string());
        assert_eq!(err.to_string(), "SQL error: no such table");
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}

//! Concrete LLM providers.

pub mod gemini;
pub mod ollama;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

use copilot_core::AppError;
use reqwest::StatusCode;

/// Marker Gemini puts in quota-exceeded error bodies.
const QUOTA_STATUS: &str = "RESOURCE_EXHAUSTED";

/// Convert a non-success HTTP reply into an `AppError`.
///
/// Quota rejections become `RateLimited`; everything else is a plain `Llm`
/// error and must not be retried.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> AppError {
    let message = format!("{} API error ({}): {}", provider, status, body.trim());

    if status == StatusCode::TOO_MANY_REQUESTS || body.contains(QUOTA_STATUS) {
        AppError::RateLimited(message)
    } else {
        AppError::Llm(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_429_is_rate_limited() {
        let err = status_error("Gemini", StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_resource_exhausted_body_is_rate_limited() {
        let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#;
        let err = status_error("Gemini", StatusCode::BAD_REQUEST, body);
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_other_statuses_are_fatal() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = status_error("Gemini", status, "nope");
            assert!(matches!(err, AppError::Llm(_)), "{} should be fatal", status);
        }
    }
}

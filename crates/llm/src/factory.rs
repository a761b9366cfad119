//! LLM provider factory.
//!
//! Resolves a provider name from configuration into a concrete client.
//! Credential presence is checked here as well as in `AppConfig::validate`,
//! so library callers that skip validation still fail before the first call.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use copilot_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom base URL
/// * `api_key` - API key (required for Gemini)
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required key
/// is missing or blank.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::Gemini => {
            let key = api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    AppError::Config("Gemini provider requires an API key".to_string())
                })?;
            let client = match endpoint {
                Some(url) => GeminiClient::with_base_url(url, key),
                None => GeminiClient::new(key),
            };
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url),
                None => OllamaClient::new(),
            };
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gemini_client() {
        let client = create_client("gemini", None, Some("secret")).unwrap();
        assert_eq!(client.provider_name(), "gemini");
    }

    #[test]
    fn test_gemini_requires_api_key() {
        for key in [None, Some(""), Some("   ")] {
            match create_client("gemini", None, key) {
                Err(AppError::Config(msg)) => assert!(msg.contains("requires an API key")),
                Err(other) => panic!("unexpected error: {}", other),
                Ok(_) => panic!("Expected error for Gemini without API key"),
            }
        }
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("openai", None, Some("k")) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}

//! Remote text-generation integration for the Retention Copilot.
//!
//! Generation and intent classification both go through the [`LlmClient`]
//! capability, so the pipeline never depends on a concrete provider and tests
//! can substitute [`MockClient`].
//!
//! # Providers
//! - **Gemini**: Google Generative Language REST API (default)
//! - **Ollama**: Local LLM runtime
//!
//! Rate-limit rejections surface as `AppError::RateLimited`; wrap any client in
//! [`RetryingClient`] to retry them on the backoff schedule.
//!
//! # Example
//! ```no_run
//! use copilot_llm::{create_client, LlmRequest, RetryPolicy, RetryingClient, LlmClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("gemini", None, Some("api-key"))?;
//! let client = RetryingClient::new(client, RetryPolicy::default());
//! let request = LlmRequest::new("Summarise churn drivers.", "gemini-2.5-flash");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod mock;
pub mod providers;
pub mod retry;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use mock::MockClient;
pub use providers::{GeminiClient, OllamaClient};
pub use retry::{RetryPolicy, RetryingClient};
pub use types::ProviderType;

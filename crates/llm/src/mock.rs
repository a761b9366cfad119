//! In-process `LlmClient` for tests and offline runs.

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use copilot_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted client that never touches the network.
///
/// Replies are consumed in order; once the script runs dry the fallback
/// reply is returned for every further call.
pub struct MockClient {
    script: Mutex<VecDeque<AppResult<String>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockClient {
    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer with each scripted result in turn, then fail.
    pub fn scripted(replies: Vec<AppResult<String>>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of `complete` calls seen so far.
    pub fn calls(&self) -> usize {
        self.prompts().len()
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }

        let next = self
            .script
            .lock()
            .map_err(|_| AppError::Other("mock script lock poisoned".to_string()))?
            .pop_front();

        let content = match (next, &self.fallback) {
            (Some(reply), _) => reply?,
            (None, Some(text)) => text.clone(),
            (None, None) => return Err(AppError::Llm("mock script exhausted".to_string())),
        };

        Ok(LlmResponse::text(content, request.model.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let mock = MockClient::scripted(vec![
            Ok("sql".to_string()),
            Err(AppError::Llm("boom".to_string())),
        ]);
        let request = LlmRequest::new("classify", "m");

        assert_eq!(mock.complete(&request).await.unwrap().content, "sql");
        assert!(mock.complete(&request).await.is_err());
        assert!(mock.complete(&request).await.is_err());
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.prompts()[0], "classify");
    }

    #[tokio::test]
    async fn test_replying_repeats() {
        let mock = MockClient::replying("rag");
        let request = LlmRequest::new("q", "m");
        for _ in 0..3 {
            assert_eq!(mock.complete(&request).await.unwrap().content, "rag");
        }
    }
}

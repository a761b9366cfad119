//! Rate-limit retry decorator.
//!
//! [`RetryingClient`] wraps any [`LlmClient`] and retries calls that fail with
//! `AppError::RateLimited`, sleeping through a fixed backoff schedule between
//! attempts. Every other error is returned on the spot.

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use copilot_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Backoff schedule for rate-limited calls.
///
/// One delay per retry; the number of delays is the retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    /// 10 s, 30 s, 60 s: three retries, four attempts in total.
    fn default() -> Self {
        Self::new(vec![
            Duration::from_secs(10),
            Duration::from_secs(30),
            Duration::from_secs(60),
        ])
    }
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    pub fn max_retries(&self) -> usize {
        self.delays.len()
    }

    /// Delay before retry number `retry` (zero-based), if the budget allows it.
    pub fn delay_for_retry(&self, retry: usize) -> Option<Duration> {
        self.delays.get(retry).copied()
    }
}

/// `LlmClient` decorator that retries rate-limited calls.
pub struct RetryingClient {
    inner: Arc<dyn LlmClient>,
    policy: RetryPolicy,
    cancel: Option<CancellationToken>,
}

impl RetryingClient {
    pub fn new(inner: Arc<dyn LlmClient>, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            cancel: None,
        }
    }

    /// Abort the retry loop when `token` fires.
    ///
    /// Cancellation is observed before each attempt and during backoff sleeps.
    /// An attempt already in flight runs to completion.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    async fn backoff(&self, delay: Duration) -> AppResult<()> {
        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(cancelled()),
                _ = tokio::time::sleep(delay) => Ok(()),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

fn cancelled() -> AppError {
    AppError::Cancelled("generation retry loop cancelled".to_string())
}

#[async_trait::async_trait]
impl LlmClient for RetryingClient {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let mut retry = 0;

        loop {
            if self.is_cancelled() {
                return Err(cancelled());
            }

            let err = match self.inner.complete(request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_rate_limited() => err,
                Err(err) => return Err(err),
            };

            let Some(delay) = self.policy.delay_for_retry(retry) else {
                tracing::error!(
                    "Rate limit persisted after {} retries, giving up",
                    self.policy.max_retries()
                );
                return Err(err);
            };

            retry += 1;
            tracing::warn!(
                "Rate limited by {} (retry {}/{} in {}s): {}",
                self.inner.provider_name(),
                retry,
                self.policy.max_retries(),
                delay.as_secs(),
                err
            );

            self.backoff(delay).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockClient;
    use tokio::time::Instant;

    fn rate_limited() -> AppResult<String> {
        Err(AppError::RateLimited("429 Too Many Requests".to_string()))
    }

    fn assert_elapsed(start: Instant, secs: u64) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_secs(secs) && elapsed < Duration::from_secs(secs + 1),
            "elapsed {:?}, expected ~{}s",
            elapsed,
            secs
        );
    }

    fn request() -> LlmRequest {
        LlmRequest::new("prompt", "gemini-2.5-flash")
    }

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.delay_for_retry(0), Some(Duration::from_secs(10)));
        assert_eq!(policy.delay_for_retry(1), Some(Duration::from_secs(30)));
        assert_eq!(policy.delay_for_retry(2), Some(Duration::from_secs(60)));
        assert_eq!(policy.delay_for_retry(3), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let mock = Arc::new(MockClient::replying("### Summary\nok"));
        let client = RetryingClient::new(mock.clone(), RetryPolicy::default());

        let response = client.complete(&request()).await.unwrap();
        assert_eq!(response.content, "### Summary\nok");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_rate_limit() {
        let mock = Arc::new(MockClient::scripted(vec![
            rate_limited(),
            Ok("answer".to_string()),
        ]));
        let client = RetryingClient::new(mock.clone(), RetryPolicy::default());

        let start = Instant::now();
        let response = client.complete(&request()).await.unwrap();

        assert_eq!(response.content, "answer");
        assert_eq!(mock.calls(), 2);
        assert_elapsed(start, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhausts_schedule() {
        let mock = Arc::new(MockClient::scripted(vec![
            rate_limited(),
            rate_limited(),
            rate_limited(),
            rate_limited(),
            Ok("never reached".to_string()),
        ]));
        let client = RetryingClient::new(mock.clone(), RetryPolicy::default());

        let start = Instant::now();
        let err = client.complete(&request()).await.unwrap_err();

        assert!(err.is_rate_limited());
        assert_eq!(mock.calls(), 4);
        assert_elapsed(start, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let mock = Arc::new(MockClient::scripted(vec![
            Err(AppError::Llm("401 Unauthorized".to_string())),
            Ok("never reached".to_string()),
        ]));
        let client = RetryingClient::new(mock.clone(), RetryPolicy::default());

        let start = Instant::now();
        let err = client.complete(&request()).await.unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
        assert_eq!(mock.calls(), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_backoff() {
        let mock = Arc::new(MockClient::scripted(vec![
            rate_limited(),
            rate_limited(),
            rate_limited(),
            rate_limited(),
        ]));
        let token = CancellationToken::new();
        let client = Arc::new(
            RetryingClient::new(mock.clone(), RetryPolicy::default())
                .with_cancellation(token.clone()),
        );

        let task = {
            let client = client.clone();
            tokio::spawn(async move { client.complete(&request()).await })
        };

        // First backoff ends at 10s, second attempt fails, second backoff runs to 40s.
        tokio::time::sleep(Duration::from_secs(15)).await;
        token.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, AppError::Cancelled(_)));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let mock = Arc::new(MockClient::replying("unused"));
        let token = CancellationToken::new();
        token.cancel();
        let client =
            RetryingClient::new(mock.clone(), RetryPolicy::default()).with_cancellation(token);

        assert!(matches!(
            client.complete(&request()).await,
            Err(AppError::Cancelled(_))
        ));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_retry_policy() {
        let mock = Arc::new(MockClient::scripted(vec![rate_limited()]));
        let client = RetryingClient::new(mock.clone(), RetryPolicy::none());

        assert!(client.complete(&request()).await.unwrap_err().is_rate_limited());
        assert_eq!(mock.calls(), 1);
    }
}

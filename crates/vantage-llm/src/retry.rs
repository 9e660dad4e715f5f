//! Retry decorator for inference providers

use async_trait::async_trait;
use tracing::warn;
use vantage_domain::{Classify, CompletionRequest, InferenceService, RetryPolicy};

/// Wraps a provider with bounded retry and exponential backoff
///
/// Only `TransientService` failures (timeouts, 429, 5xx) are retried. After
/// the last attempt the final error is returned unchanged.
///
/// # Examples
///
/// ```
/// use vantage_domain::{CompletionRequest, InferenceService, RetryPolicy};
/// use vantage_llm::{MockProvider, WithRetry};
///
/// # tokio_test::block_on(async {
/// let mock = MockProvider::new("ok");
/// mock.fail_times("", 2, 503);
///
/// let provider = WithRetry::new(mock.clone(), RetryPolicy::immediate(3));
/// let text = provider.complete(&CompletionRequest::deterministic("hi", 5)).await.unwrap();
/// assert_eq!(text, "ok");
/// assert_eq!(mock.call_count(), 3);
/// # });
/// ```
pub struct WithRetry<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> WithRetry<P> {
    /// Wrap `inner` with `policy`
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: InferenceService> InferenceService for WithRetry<P> {
    type Error = P::Error;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let mut attempt = 1;
        loop {
            match self.inner.complete(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.policy.attempts() => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        model = %self.inner.model_name(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Inference call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

//! Mock inference provider for deterministic testing

use crate::InferenceError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use vantage_domain::{CompletionRequest, InferenceService};

#[derive(Debug)]
struct Rule {
    needle: String,
    outcome: Outcome,
}

#[derive(Debug)]
enum Outcome {
    Respond(String),
    /// Fail with this status for the next `remaining` matching calls;
    /// `None` fails forever
    Fail { status: u16, remaining: Option<usize> },
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<Rule>,
    requests: Vec<CompletionRequest>,
}

/// Mock provider returning pre-configured responses
///
/// Rules match when the prompt contains their needle and are checked in the
/// order they were added; unmatched prompts get the default response. Clones
/// share state, so a test can keep one handle while the pipeline owns another.
///
/// # Examples
///
/// ```
/// use vantage_domain::{CompletionRequest, InferenceService};
/// use vantage_llm::MockProvider;
///
/// # tokio_test::block_on(async {
/// let provider = MockProvider::new("default");
/// provider.add_response("valve", "sticky valve analysis");
/// provider.add_failure("broken", 401);
///
/// let ask = |p: &str| CompletionRequest::deterministic(p, 10);
/// assert_eq!(provider.complete(&ask("the valve sticks")).await.unwrap(), "sticky valve analysis");
/// assert_eq!(provider.complete(&ask("anything")).await.unwrap(), "default");
/// assert!(provider.complete(&ask("broken record")).await.is_err());
/// assert_eq!(provider.call_count(), 3);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a mock with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Respond with `response` to prompts containing `needle`
    pub fn add_response(&self, needle: impl Into<String>, response: impl Into<String>) {
        self.state().rules.push(Rule {
            needle: needle.into(),
            outcome: Outcome::Respond(response.into()),
        });
    }

    /// Always fail prompts containing `needle` with an HTTP status
    pub fn add_failure(&self, needle: impl Into<String>, status: u16) {
        self.state().rules.push(Rule {
            needle: needle.into(),
            outcome: Outcome::Fail {
                status,
                remaining: None,
            },
        });
    }

    /// Fail the next `times` prompts containing `needle`, then fall through
    pub fn fail_times(&self, needle: impl Into<String>, times: usize, status: u16) {
        self.state().rules.push(Rule {
            needle: needle.into(),
            outcome: Outcome::Fail {
                status,
                remaining: Some(times),
            },
        });
    }

    /// Number of `complete` calls so far, failed ones included
    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Every request received, in call order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.state().requests.clone()
    }

    /// Reset the recorded requests
    pub fn reset_call_count(&self) {
        self.state().requests.clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl InferenceService for MockProvider {
    type Error = InferenceError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let mut state = self.state();
        state.requests.push(request.clone());

        for rule in state.rules.iter_mut() {
            if !request.prompt.contains(&rule.needle) {
                continue;
            }
            match &mut rule.outcome {
                Outcome::Respond(text) => return Ok(text.clone()),
                Outcome::Fail { status, remaining } => match remaining {
                    Some(0) => continue,
                    Some(n) => {
                        *n -= 1;
                        return Err(mock_failure(*status));
                    }
                    None => return Err(mock_failure(*status)),
                },
            }
        }

        Ok(self.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

fn mock_failure(status: u16) -> InferenceError {
    InferenceError::Http {
        status,
        body: "Mock error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_domain::Classify;

    fn ask(prompt: &str) -> CompletionRequest {
        CompletionRequest::deterministic(prompt, 100)
    }

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let provider = MockProvider::default();
        provider.add_response("spacer", "first");
        provider.add_response("spacer chamber", "second");

        let text = provider.complete(&ask("spacer chamber review")).await.unwrap();
        assert_eq!(text, "first");
    }

    #[tokio::test]
    async fn test_fail_times_then_recovers() {
        let provider = MockProvider::new("ok");
        provider.fail_times("flaky", 2, 503);

        for _ in 0..2 {
            let err = provider.complete(&ask("flaky call")).await.unwrap_err();
            assert!(err.is_transient());
        }
        assert_eq!(provider.complete(&ask("flaky call")).await.unwrap(), "ok");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let provider = MockProvider::new("ok");
        let handle = provider.clone();
        provider.complete(&ask("a")).await.unwrap();
        assert_eq!(handle.call_count(), 1);
        assert_eq!(handle.requests()[0].temperature, 0.0);

        handle.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }
}

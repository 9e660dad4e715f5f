//! Vantage Inference Provider Layer
//!
//! Implementations of the `InferenceService` trait from `vantage-domain`.
//!
//! # Providers
//!
//! - [`OpenAiProvider`]: OpenAI-compatible chat completions API
//! - [`OllamaProvider`]: local Ollama API
//! - [`MockProvider`]: deterministic mock for testing
//!
//! Providers make exactly one HTTP call per `complete`. Wrap them in
//! [`WithRetry`] to get bounded retry with exponential backoff on
//! transient failures.
//!
//! # Examples
//!
//! ```
//! use vantage_domain::{CompletionRequest, InferenceService};
//! use vantage_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new(r#"{"sentiment": "positive"}"#);
//! let request = CompletionRequest::deterministic("Analyse this review", 500);
//! let text = provider.complete(&request).await.unwrap();
//! assert_eq!(text, r#"{"sentiment": "positive"}"#);
//! # });
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod ollama;
pub mod openai;
mod retry;

use thiserror::Error;
use vantage_domain::{Classify, FailureKind};

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use retry::WithRetry;

/// Errors that can occur during inference calls
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Could not reach the service
    #[error("Communication error: {0}")]
    Communication(String),

    /// Service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body, for the log
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The API key environment variable is unset or empty
    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),

    /// Model not available on the service
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

impl InferenceError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InferenceError::Timeout(e.to_string())
        } else if e.is_decode() {
            InferenceError::InvalidResponse(e.to_string())
        } else {
            InferenceError::Communication(e.to_string())
        }
    }
}

impl Classify for InferenceError {
    fn kind(&self) -> FailureKind {
        match self {
            InferenceError::Timeout(_) | InferenceError::Communication(_) => {
                FailureKind::TransientService
            }
            InferenceError::Http { status, .. } if matches!(*status, 408 | 429) || *status >= 500 => {
                FailureKind::TransientService
            }
            InferenceError::Http { .. }
            | InferenceError::MissingApiKey(_)
            | InferenceError::ModelNotAvailable(_) => FailureKind::PermanentService,
            InferenceError::InvalidResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> InferenceError {
        InferenceError::Http {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_rate_limit_and_server_errors_are_transient() {
        assert!(http(408).is_transient());
        assert!(http(429).is_transient());
        assert!(http(500).is_transient());
        assert!(http(503).is_transient());
        assert!(InferenceError::Timeout("30s".into()).is_transient());
    }

    #[test]
    fn test_client_errors_are_permanent() {
        for status in [400, 401, 403, 404] {
            assert_eq!(http(status).kind(), FailureKind::PermanentService);
        }
        assert_eq!(
            InferenceError::MissingApiKey("OPENAI_API_KEY".into()).kind(),
            FailureKind::PermanentService
        );
    }

    #[test]
    fn test_invalid_body_is_malformed() {
        let err = InferenceError::InvalidResponse("no choices".into());
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
        assert!(!err.is_transient());
    }
}

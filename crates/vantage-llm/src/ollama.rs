//! Ollama Provider Implementation
//!
//! Local models through Ollama's `/api/generate`. Temperature and output
//! length are passed as `options.temperature` and `options.num_predict`.
//!
//! # Examples
//!
//! ```no_run
//! use vantage_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
//! ```

use crate::InferenceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use vantage_domain::{CompletionRequest, InferenceService};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for inference requests (120 seconds; local models are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama API provider for local inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, InferenceError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Ollama provider with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Communication(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }

    /// Provider on the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, InferenceError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> OllamaGenerateRequest<'a> {
        OllamaGenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

#[async_trait]
impl InferenceService for OllamaProvider {
    type Error = InferenceError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let url = format!("{}/api/generate", self.endpoint);
        debug!(model = %self.model, "Ollama generate request");

        let response = self
            .client
            .post(&url)
            .json(&self.body(request))
            .send()
            .await
            .map_err(InferenceError::from_reqwest)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InferenceError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let generated: OllamaGenerateResponse =
            response.json().await.map_err(InferenceError::from_reqwest)?;
        Ok(generated.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

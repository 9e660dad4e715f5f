//! OpenAI Provider Implementation
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. The prompt is
//! sent as a single user message; temperature and `max_tokens` come from the
//! [`CompletionRequest`].
//!
//! # Examples
//!
//! ```no_run
//! use vantage_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::from_env("OPENAI_API_KEY", "gpt-4o-mini").unwrap();
//! ```

use crate::InferenceError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use vantage_domain::{CompletionRequest, InferenceService};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for inference requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider with an explicit API key
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, InferenceError> {
        Self::with_timeout(api_key, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with an explicit request timeout
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Communication(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            client,
        })
    }

    /// Create a provider reading the API key from an environment variable
    pub fn from_env(key_var: &str, model: impl Into<String>) -> Result<Self, InferenceError> {
        let api_key = std::env::var(key_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| InferenceError::MissingApiKey(key_var.to_string()))?;
        Self::new(api_key, model)
    }

    /// Point the provider at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap, InferenceError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| InferenceError::MissingApiKey("API key is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl InferenceService for OpenAiProvider {
    type Error = InferenceError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, max_tokens = request.max_tokens, "Chat completion request");

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
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

        let chat: ChatResponse = response.json().await.map_err(InferenceError::from_reqwest)?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| InferenceError::InvalidResponse("No content in response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

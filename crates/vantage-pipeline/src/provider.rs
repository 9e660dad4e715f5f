//! Inference backend chosen at run time

use crate::config::{InferenceConfig, ProviderKind};
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::Duration;
use vantage_domain::{CompletionRequest, InferenceService, RetryPolicy};
use vantage_llm::{openai, InferenceError, MockProvider, OllamaProvider, OpenAiProvider, WithRetry};

const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Any configured backend, behind call-level retry
pub enum Provider {
    /// OpenAI-compatible endpoint
    OpenAi(WithRetry<OpenAiProvider>),

    /// Local Ollama server
    Ollama(WithRetry<OllamaProvider>),

    /// Canned responses
    Mock(WithRetry<MockProvider>),
}

impl Provider {
    /// Build the backend named in `config`
    ///
    /// Fails with a permanent error when the API key variable is unset.
    pub fn from_config(config: &InferenceConfig, retry: RetryPolicy) -> Result<Self, PipelineError> {
        let timeout = config.timeout_secs.map(Duration::from_secs);
        let provider = match config.provider {
            ProviderKind::OpenAi => {
                let model = config.model.as_deref().unwrap_or(openai::DEFAULT_MODEL);
                let key = std::env::var(&config.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| {
                        PipelineError::inference(InferenceError::MissingApiKey(
                            config.api_key_env.clone(),
                        ))
                    })?;
                let mut client = match timeout {
                    Some(t) => OpenAiProvider::with_timeout(key, model, t),
                    None => OpenAiProvider::new(key, model),
                }
                .map_err(PipelineError::inference)?;
                if let Some(url) = &config.base_url {
                    client = client.with_base_url(url);
                }
                Provider::OpenAi(WithRetry::new(client, retry))
            }
            ProviderKind::Ollama => {
                let model = config.model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
                let endpoint = config
                    .base_url
                    .as_deref()
                    .unwrap_or(vantage_llm::ollama::DEFAULT_ENDPOINT);
                let client = match timeout {
                    Some(t) => OllamaProvider::with_timeout(endpoint, model, t),
                    None => OllamaProvider::new(endpoint, model),
                }
                .map_err(PipelineError::inference)?;
                Provider::Ollama(WithRetry::new(client, retry))
            }
            ProviderKind::Mock => Provider::Mock(WithRetry::new(
                MockProvider::new(config.mock_response.clone()),
                retry,
            )),
        };
        Ok(provider)
    }
}

#[async_trait]
impl InferenceService for Provider {
    type Error = InferenceError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        match self {
            Provider::OpenAi(p) => p.complete(request).await,
            Provider::Ollama(p) => p.complete(request).await,
            Provider::Mock(p) => p.complete(request).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            Provider::OpenAi(p) => p.model_name(),
            Provider::Ollama(p) => p.model_name(),
            Provider::Mock(p) => p.model_name(),
        }
    }
}

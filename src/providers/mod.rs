/*!
 * Provider implementations for the text-generation backend.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API and OpenAI-compatible servers (LM Studio)
 * - Anthropic: Anthropic API integration
 * - Mock: deterministic stand-in for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{GenerationConfig, GenerationProvider};
use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// A provider turns a fully rendered prompt into free-form generated text.
/// Each call is a single attempt against the backend; retrying is left to the
/// caller, which uses `ProviderError::is_transient` to decide.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Human-readable provider name used in logs
    fn name(&self) -> &str;

    /// Complete a prompt using this provider
    ///
    /// # Arguments
    /// * `prompt` - The rendered prompt
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The generated text or an error
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Build the provider selected by the configuration
pub fn from_config(config: &GenerationConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let endpoint = config.get_endpoint();
    let model = config.get_model();
    let timeout = Duration::from_secs(config.get_timeout_secs());
    let common = &config.common;

    let provider: Arc<dyn Provider> = match config.provider {
        GenerationProvider::Ollama => Arc::new(
            ollama::Ollama::from_url(endpoint, timeout)?
                .with_model(model, common.temperature, common.max_tokens),
        ),
        GenerationProvider::OpenAI => Arc::new(openai::OpenAI::new(
            "OpenAI",
            config.get_api_key(),
            endpoint,
            model,
            common.temperature,
            common.max_tokens,
            timeout,
        )),
        GenerationProvider::LMStudio => {
            // LM Studio often doesn't require an API key; use a default if empty
            let api_key = {
                let k = config.get_api_key();
                if k.is_empty() { "lm-studio".to_string() } else { k }
            };
            Arc::new(openai::OpenAI::new(
                "LM Studio",
                api_key,
                endpoint,
                model,
                common.temperature,
                common.max_tokens,
                timeout,
            ))
        }
        GenerationProvider::Anthropic => Arc::new(anthropic::Anthropic::new(
            config.get_api_key(),
            endpoint,
            model,
            common.temperature,
            common.max_tokens,
            timeout,
        )),
    };

    Ok(provider)
}

/// Build a pooled HTTP client with the given request timeout
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_default()
}

/// Read the body of a response, turning non-success statuses into errors
pub(crate) async fn success_body(
    provider: &str,
    response: reqwest::Response,
) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await.map_err(ProviderError::from_reqwest)?;

    if status.is_success() {
        Ok(body)
    } else {
        log::error!("{} API error ({}): {}", provider, status, truncate(&body, 500));
        Err(ProviderError::from_status(status.as_u16(), body))
    }
}

/// Shorten text for log output
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

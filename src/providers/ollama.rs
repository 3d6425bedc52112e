use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{http_client, success_body, truncate, Provider};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model used by `Provider::complete`
    model: String,
    /// Sampling temperature used by `Provider::complete`
    temperature: Option<f32>,
    /// Token cap sent as `options.num_predict`
    num_predict: Option<u32>,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default = "default_done")]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

fn default_done() -> bool {
    true
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: None,
            stream: Some(false),
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Cap the number of generated tokens
    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let url = url.into();
        let parsed = Url::parse(&url)
            .map_err(|e| ProviderError::InvalidConfiguration(format!("invalid Ollama endpoint '{}': {}", url, e)))?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            client: http_client(timeout),
            model: "llama3.1".to_string(),
            temperature: None,
            num_predict: None,
        })
    }

    /// Set the model, temperature and token cap used for prompt completion
    pub fn with_model(mut self, model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        self.model = model.into();
        self.temperature = Some(temperature);
        self.num_predict = Some(max_tokens);
        self
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text from the Ollama API (single attempt)
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self.client.post(&url)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let body = success_body("Ollama", response).await?;
        parse_generation_body(&body)
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self.client.get(&url)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let body = success_body("Ollama", response).await?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ProviderError::ParseError(format!("Ollama version response: {}", e)))?;

        value["version"].as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

/// Parse a `/api/generate` body.
///
/// A non-streaming call answers with one JSON object, but some server
/// versions still stream JSON lines; in that case the `response` pieces are
/// concatenated.
fn parse_generation_body(body: &str) -> Result<GenerationResponse, ProviderError> {
    let first_error = match serde_json::from_str::<GenerationResponse>(body) {
        Ok(response) => return Ok(response),
        Err(e) => e,
    };

    let chunks: Vec<GenerationResponse> = body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<GenerationResponse>(line).ok())
        .collect();

    let Some(last) = chunks.last() else {
        error!("Failed to parse Ollama API response: {}. Raw response: {}", first_error, truncate(body, 500));
        return Err(ProviderError::ParseError(format!(
            "Ollama response contains invalid JSON: {}",
            first_error
        )));
    };

    Ok(GenerationResponse {
        model: last.model.clone(),
        created_at: last.created_at.clone(),
        response: chunks.iter().map(|c| c.response.as_str()).collect(),
        done: chunks.iter().any(|c| c.done),
        prompt_eval_count: last.prompt_eval_count,
        eval_count: last.eval_count,
    })
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut request = GenerationRequest::new(self.model.clone(), prompt);
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }
        if let Some(num_predict) = self.num_predict {
            request = request.num_predict(num_predict);
        }

        let response = self.generate(request).await?;
        Ok(response.response)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }
}

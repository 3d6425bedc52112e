/*!
 * Core translation service implementation.
 *
 * `SqlTranslator` is the facade exposed to the transport: it owns the schema
 * store, the provider and the retry policy, and composes normalization,
 * prompt construction, generation and extraction for each request.
 */

use log::{debug, error, info, warn};
use std::fmt;
use std::sync::Arc;

use crate::app_config::GenerationConfig;
use crate::errors::{NoQueryReason, ProviderError, TranslationError};
use crate::providers::{self, truncate, Provider};
use super::extraction::extract_sql;
use super::normalize::strip_diacritics;
use super::prompts::{SqlPromptBuilder, REFUSAL_SENTINEL};
use super::retry::RetryPolicy;
use super::schema::{SchemaPayload, SchemaStore};

/// Acknowledgement returned by a successful context update
pub const CONTEXT_UPDATED: &str = "Context updated successfully!";

/// Successful result of a translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// A validated SELECT statement
    Query(String),
    /// The model declined to answer with a query
    Refused,
}

impl fmt::Display for TranslationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(sql) => f.write_str(sql),
            Self::Refused => f.write_str(REFUSAL_SENTINEL),
        }
    }
}

/// Natural-language to SQL translation service
pub struct SqlTranslator {
    /// Shared schema context
    schema: Arc<SchemaStore>,

    /// Text-generation backend
    provider: Arc<dyn Provider>,

    /// Prompt construction
    prompts: SqlPromptBuilder,

    /// Retry policy around generation + extraction
    retry: RetryPolicy,
}

impl SqlTranslator {
    /// Create a translator from its parts
    pub fn new(schema: Arc<SchemaStore>, provider: Arc<dyn Provider>, retry: RetryPolicy) -> Self {
        Self {
            schema,
            provider,
            prompts: SqlPromptBuilder::default(),
            retry,
        }
    }

    /// Create a translator for the configured provider
    pub fn from_config(config: &GenerationConfig, schema: Arc<SchemaStore>) -> Result<Self, ProviderError> {
        let provider = providers::from_config(config)?;
        info!(
            "Using {} provider with model {} ({} attempts, {} ms between attempts)",
            config.provider.display_name(),
            config.get_model(),
            config.common.max_attempts.max(1),
            config.common.retry_delay_ms
        );
        Ok(Self::new(schema, provider, RetryPolicy::from_config(&config.common)))
    }

    /// Replace the prompt builder
    pub fn with_prompt_builder(mut self, prompts: SqlPromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// The schema store this translator reads from
    pub fn schema(&self) -> &SchemaStore {
        &self.schema
    }

    /// The generation backend
    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// Replace the schema context
    pub fn update_context(&self, payload: SchemaPayload) -> Result<String, TranslationError> {
        self.schema.update(payload)?;
        Ok(CONTEXT_UPDATED.to_string())
    }

    /// Translate a natural-language question into a SELECT statement
    pub async fn translate(&self, query: &str) -> Result<TranslationOutcome, TranslationError> {
        let request_id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        info!("[{}] Question: {}", request_id, truncate(query, 200));

        let schema = self.schema.read();
        if schema.is_empty() {
            warn!("[{}] Rejected: no schema configured", request_id);
            return Err(TranslationError::NoSchemaConfigured);
        }

        let normalized = strip_diacritics(query);
        let prompt = self.prompts.build(&normalized, &schema);
        debug!("[{}] Prompt built ({} chars, {} tables)", request_id, prompt.len(), schema.len());

        let provider = &self.provider;
        let prompt = prompt.as_str();
        let id = request_id.as_str();

        let result = self.retry.run(move |attempt| async move {
            debug!("[{}] Attempt {} via {}", id, attempt, provider.name());
            let generated = provider.complete(prompt).await?;
            debug!("[{}] Backend response: {}", id, truncate(&generated, 500));
            extract_sql(&generated)
        }).await;

        match result {
            Ok(sql) => {
                info!("[{}] Query: {}", request_id, sql);
                Ok(TranslationOutcome::Query(sql))
            }
            Err(TranslationError::NoQueryFound(NoQueryReason::Refused)) => {
                info!("[{}] Model declined the request", request_id);
                Ok(TranslationOutcome::Refused)
            }
            Err(e) => {
                error!("[{}] Translation failed: {}", request_id, e);
                Err(e)
            }
        }
    }

    /// `update_context` rendered as a plain string for the RPC boundary
    pub fn update_context_reply(&self, payload: SchemaPayload) -> String {
        match self.update_context(payload) {
            Ok(ack) => ack,
            Err(e) => {
                error!("Error updating schema context: {}", e);
                format!("Error: {}", e)
            }
        }
    }

    /// `translate` rendered as a plain string for the RPC boundary: the SQL,
    /// the refusal sentinel, or an `Error: ...` message
    pub async fn translate_reply(&self, query: &str) -> String {
        match self.translate(query).await {
            Ok(outcome) => outcome.to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }
}

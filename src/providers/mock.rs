/*!
 * Mock provider implementation for testing.
 *
 * This module provides a deterministic provider that simulates different
 * backend behaviors without any network access:
 * - `MockProvider::responding(text)` - Always succeeds with the given text
 * - `MockProvider::failing_then(n, text)` - Fails transiently `n` times, then succeeds
 * - `MockProvider::transient_failure()` - Always fails with a retryable error
 * - `MockProvider::permanent_failure()` - Always fails with a non-retryable error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with the given text
    Respond(String),
    /// Fails with a transient error for the first `failures` calls, then responds
    FailFirst { failures: usize, response: String },
    /// Always fails with a transient error
    TransientFailure,
    /// Always fails with a permanent error
    PermanentFailure,
    /// Responds after a delay
    Slow { delay_ms: u64, response: String },
}

/// Mock provider for testing pipeline behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of `complete` calls made, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Last prompt received, shared between clones
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock provider that always answers with `text`
    pub fn responding(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Respond(text.into()))
    }

    /// Create a mock that fails transiently `failures` times before answering
    pub fn failing_then(failures: usize, text: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailFirst { failures, response: text.into() })
    }

    /// Create a mock that always fails transiently
    pub fn transient_failure() -> Self {
        Self::new(MockBehavior::TransientFailure)
    }

    /// Create a mock that always fails permanently
    pub fn permanent_failure() -> Self {
        Self::new(MockBehavior::PermanentFailure)
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64, text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Slow { delay_ms, response: text.into() })
    }

    /// Wrap a SQL string in a fenced block the way a model would
    pub fn fenced(sql: &str) -> String {
        format!("```sql\n{}\n```", sql)
    }

    /// Number of `complete` calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            last_prompt: Arc::clone(&self.last_prompt),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock() = Some(prompt.to_string());

        match &self.behavior {
            MockBehavior::Respond(text) => Ok(text.clone()),
            MockBehavior::FailFirst { failures, response } => {
                if count < *failures {
                    Err(ProviderError::ConnectionError(format!("simulated outage (call {})", count + 1)))
                } else {
                    Ok(response.clone())
                }
            }
            MockBehavior::TransientFailure => Err(ProviderError::ApiError {
                status_code: 503,
                message: "Service temporarily unavailable".to_string(),
            }),
            MockBehavior::PermanentFailure => Err(ProviderError::AuthenticationError(
                "Invalid API key".to_string(),
            )),
            MockBehavior::Slow { delay_ms, response } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(response.clone())
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::TransientFailure => Err(ProviderError::ConnectionError("mock offline".to_string())),
            MockBehavior::PermanentFailure => Err(ProviderError::AuthenticationError("Invalid API key".to_string())),
            _ => Ok(()),
        }
    }
}

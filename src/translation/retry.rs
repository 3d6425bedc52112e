/*!
 * Bounded retry for generation round-trips.
 *
 * Only transient backend failures are retried. Extraction outcomes such as
 * `NotASelectStatement` are a deterministic function of the generated text
 * and are returned as soon as they happen.
 */

use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

use crate::app_config::GenerationCommonConfig;
use crate::errors::TranslationError;

/// Attempt ceiling and fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least one attempt
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Build the policy from the shared generation settings
    pub fn from_config(common: &GenerationCommonConfig) -> Self {
        Self::new(common.max_attempts, Duration::from_millis(common.retry_delay_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` until it succeeds, fails terminally, or the attempts run out.
    ///
    /// The operation receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, TranslationError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, TranslationError>>,
    {
        let mut last_error: Option<TranslationError> = None;

        for attempt in 1..=self.max_attempts {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Succeeded on attempt {}/{}", attempt, self.max_attempts);
                    }
                    return Ok(value);
                }
                Err(error) if error.is_transient() => {
                    warn!("Attempt {}/{} failed: {}", attempt, self.max_attempts, error);
                    last_error = Some(error);

                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(error) => return Err(error),
            }
        }

        let last_error = match last_error {
            Some(TranslationError::BackendTransient(provider_error)) => provider_error.to_string(),
            Some(other) => other.to_string(),
            None => "no attempt was made".to_string(),
        };

        Err(TranslationError::MaxRetriesExceeded {
            attempts: self.max_attempts,
            last_error,
        })
    }
}

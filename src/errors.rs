/*!
 * Error types for the sqlwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails (including timeouts)
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request could not be built from the provider configuration
    #[error("Invalid provider configuration: {0}")]
    InvalidConfiguration(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    ///
    /// Network failures, timeouts, server-side errors, throttling and
    /// malformed response bodies are transient. Authentication failures,
    /// other client errors and configuration problems are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_)
            | Self::ParseError(_)
            | Self::ConnectionError(_)
            | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => {
                *status_code >= 500 || *status_code == 408 || *status_code == 429
            }
            Self::AuthenticationError(_) | Self::InvalidConfiguration(_) => false,
        }
    }

    /// Map a `reqwest` transport failure onto a provider error
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::RequestFailed(format!("request timed out: {}", error))
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }

    /// Map a non-success HTTP status and its body onto a provider error
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Why a generation produced no usable query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoQueryReason {
    /// The output contained no fenced block
    MissingFence,
    /// The first fenced block was empty
    EmptyFence,
    /// The model answered with the refusal sentinel
    Refused,
}

/// Errors that can occur during query translation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// The schema payload was not a JSON object
    #[error("Failed to update the schema context: {0}")]
    SchemaParse(String),

    /// A translation was requested before a non-empty schema was set
    #[error("No database schema has been configured")]
    NoSchemaConfigured,

    /// The backend failed in a way that may succeed on retry
    #[error("Generation backend unavailable: {0}")]
    BackendTransient(ProviderError),

    /// The backend failed in a way retrying cannot fix
    #[error("Generation backend error: {0}")]
    BackendPermanent(ProviderError),

    /// Every attempt failed with a transient backend error
    #[error("Generation failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Number of attempts made
        attempts: u32,
        /// Detail of the final failure
        last_error: String,
    },

    /// The generated text held no usable query
    #[error("{}", no_query_message(.0))]
    NoQueryFound(NoQueryReason),

    /// The generated query is not a SELECT statement
    #[error("The generated query does not retrieve data (only SELECT statements are allowed)")]
    NotASelectStatement,
}

fn no_query_message(reason: &NoQueryReason) -> &'static str {
    match reason {
        NoQueryReason::MissingFence | NoQueryReason::EmptyFence => {
            "Could not generate a query from this request, please try again"
        }
        NoQueryReason::Refused => "The model declined to generate a query for this request",
    }
}

impl TranslationError {
    /// Whether the retry controller may run the operation again
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BackendTransient(_))
    }

    /// Whether this is the model's refusal rather than a failure
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::NoQueryFound(NoQueryReason::Refused))
    }
}

impl From<ProviderError> for TranslationError {
    fn from(error: ProviderError) -> Self {
        if error.is_transient() {
            Self::BackendTransient(error)
        } else {
            Self::BackendPermanent(error)
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// The RPC server could not start or stopped unexpectedly
    #[error("Server error: {0}")]
    Server(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}

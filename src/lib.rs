/*!
 * # SQLwAI - Natural-language SQL with AI
 *
 * A Rust library that turns natural-language questions into read-only SQL
 * queries using a large language model, grounded on a user-supplied
 * database schema.
 *
 * ## Features
 *
 * - Replaceable schema context shared by concurrent requests
 * - Generate queries using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 *   - LM Studio (OpenAI-compatible)
 * - Accent-insensitive questions
 * - Only SELECT statements are ever returned
 * - Bounded retry on transient backend failures
 * - JSON-RPC 2.0 server exposing `updateContext` and `translate`
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The translation pipeline:
 *   - `translation::schema`: Schema context store
 *   - `translation::normalize`: Diacritic removal
 *   - `translation::prompts`: Prompt template and builder
 *   - `translation::extraction`: Query extraction and validation
 *   - `translation::retry`: Retry policy
 *   - `translation::core`: The `SqlTranslator` facade
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted provider for tests
 * - `rpc`: JSON-RPC transport
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod translation;
pub mod providers;
pub mod rpc;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use translation::{SchemaPayload, SchemaStore, SqlTranslator, TranslationOutcome};
pub use errors::{AppError, NoQueryReason, ProviderError, TranslationError};

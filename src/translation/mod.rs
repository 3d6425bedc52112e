/*!
 * Natural-language to SQL translation pipeline.
 *
 * This module contains the query-translation pipeline. It is split into
 * several submodules:
 *
 * - `schema`: Shared schema context store
 * - `normalize`: Accent removal for user questions
 * - `prompts`: Prompt template and builder
 * - `extraction`: Fenced-block extraction and SELECT validation
 * - `retry`: Bounded retry on transient backend failures
 * - `core`: The `SqlTranslator` facade composing the above
 */

// Re-export main types for easier usage
pub use self::core::{SqlTranslator, TranslationOutcome, CONTEXT_UPDATED};
pub use self::extraction::extract_sql;
pub use self::normalize::strip_diacritics;
pub use self::prompts::{PromptTemplate, SqlPromptBuilder, REFUSAL_SENTINEL};
pub use self::retry::RetryPolicy;
pub use self::schema::{SchemaContext, SchemaPayload, SchemaStore};

// Submodules
pub mod core;
pub mod extraction;
pub mod normalize;
pub mod prompts;
pub mod retry;
pub mod schema;

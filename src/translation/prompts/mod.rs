/*!
 * Prompt engineering for SQL generation.
 *
 * This module provides:
 * - The static instruction template
 * - Prompt construction from a question and the schema context
 */

pub mod templates;

// Re-export main types
pub use templates::{PromptTemplate, SqlPromptBuilder, REFUSAL_SENTINEL};

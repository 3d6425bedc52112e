/*!
 * Prompt template for natural-language to SQL translation.
 *
 * The template is a static asset: the schema and the question are the only
 * parts that change between requests.
 */

use crate::translation::schema::SchemaContext;

const SCHEMA_PLACEHOLDER: &str = "{schema_info}";
const INPUT_PLACEHOLDER: &str = "{input_text}";

/// The phrase the model is told to answer with when it cannot produce a query
pub const REFUSAL_SENTINEL: &str = "I don't know.";

/// Prompt template with `{schema_info}` and `{input_text}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default prompt for SQL generation.
    pub const SQL_TRANSLATOR: &'static str = r#"You are a SQL expert converting natural language questions into SQL SELECT statements. Generate an accurate query based only on the database schema below.

## Database Schema
{schema_info}

## User Question
{input_text}

## Rules
1. Match the question to the tables and columns of the schema above. Only use tables and columns that appear in the schema; never invent new ones.
2. If the question cannot be mapped to the schema, or is not a request for data (explanations, chit-chat, other tasks), reply exactly: I don't know.
3. Only generate SELECT statements. Never use INSERT, UPDATE, DELETE, DROP, ALTER, CREATE or any other statement that changes data or structure.
4. Return the query inside a single block delimited by triple backticks (```), with no comments, explanations or text outside the block.
5. Do not end the query with a semicolon.
6. Table names are duplicated by the application framework; for example, use `usuario_usuario` instead of `usuario`.
7. Table and column names are in Brazilian Portuguese and stored without accents. Remove accents from words in the question (`usuário` -> `usuario`, `código` -> `codigo`) when matching them to the schema.
8. For aggregations ("total", "sum", "average", "how many") use SUM, AVG or COUNT.
9. For filters ("where", "for", "with") use WHERE clauses with exact column names from the schema.
10. For ordering ("ordered by", "highest", "latest") use ORDER BY with ASC or DESC."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default SQL translator template.
    pub fn sql_translator() -> Self {
        Self::new(Self::SQL_TRANSLATOR)
    }

    /// Render the template with the given variables.
    ///
    /// Placeholders are substituted in a single pass, so braces inside the
    /// schema or the question are copied verbatim.
    pub fn render(&self, schema_info: &str, input_text: &str) -> String {
        let mut output = String::with_capacity(self.template.len() + schema_info.len() + input_text.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            output.push_str(&rest[..start]);
            let tail = &rest[start..];

            if let Some(after) = tail.strip_prefix(SCHEMA_PLACEHOLDER) {
                output.push_str(schema_info);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(INPUT_PLACEHOLDER) {
                output.push_str(input_text);
                rest = after;
            } else {
                output.push('{');
                rest = &tail[1..];
            }
        }

        output.push_str(rest);
        output
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::sql_translator()
    }
}

/// Builds the final prompt from a question and the schema context.
#[derive(Debug, Clone, Default)]
pub struct SqlPromptBuilder {
    template: PromptTemplate,
}

impl SqlPromptBuilder {
    /// Create a builder around a template
    pub fn new(template: PromptTemplate) -> Self {
        Self { template }
    }

    /// Render the prompt for an already-normalized question
    pub fn build(&self, normalized_query: &str, schema: &SchemaContext) -> String {
        // Map<String, Value> always serializes; non-ASCII is kept as-is
        let schema_info = serde_json::to_string(schema).unwrap_or_else(|_| "{}".to_string());
        self.template.render(&schema_info, normalized_query)
    }
}

/*!
 * Schema context storage.
 *
 * The schema context is the caller-supplied description of the database:
 * a JSON object mapping table names to column descriptions. It is shared by
 * every translation and replaced as a whole on update.
 */

use log::{debug, info, warn};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

use crate::errors::TranslationError;

/// Table name to opaque column description
pub type SchemaContext = Map<String, Value>;

/// Input accepted by `SchemaStore::update`
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaPayload {
    /// An already-decoded JSON value
    Structured(Value),
    /// A string holding serialized JSON
    Serialized(String),
}

impl SchemaPayload {
    /// Decode the payload into a schema context
    pub fn into_context(self) -> Result<SchemaContext, TranslationError> {
        let value = match self {
            SchemaPayload::Structured(value) => value,
            SchemaPayload::Serialized(text) => serde_json::from_str(&text)
                .map_err(|e| TranslationError::SchemaParse(format!("invalid JSON: {}", e)))?,
        };

        match value {
            Value::Object(map) => Ok(map),
            other => Err(TranslationError::SchemaParse(format!(
                "expected a JSON object mapping table names to columns, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<Value> for SchemaPayload {
    /// JSON strings are treated as serialized schemas, everything else as structured
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => SchemaPayload::Serialized(text),
            other => SchemaPayload::Structured(other),
        }
    }
}

impl From<&str> for SchemaPayload {
    fn from(text: &str) -> Self {
        SchemaPayload::Serialized(text.to_string())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Thread-safe holder of the current schema context.
///
/// Readers get an `Arc` snapshot and never block each other; an update swaps
/// the whole context under the write lock, so a reader sees either the old or
/// the new schema and never a mix.
#[derive(Debug, Default)]
pub struct SchemaStore {
    current: RwLock<Arc<SchemaContext>>,
}

impl SchemaStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored context.
    ///
    /// On error the previous context is kept.
    pub fn update(&self, payload: SchemaPayload) -> Result<(), TranslationError> {
        let context = payload.into_context()?;
        let table_count = context.len();

        *self.current.write() = Arc::new(context);

        if table_count == 0 {
            warn!("Schema context replaced with an empty schema; translations are disabled until a schema is set");
        } else {
            info!("Schema context updated ({} tables)", table_count);
        }
        Ok(())
    }

    /// Snapshot of the current context
    pub fn read(&self) -> Arc<SchemaContext> {
        self.current.read().clone()
    }

    /// Whether no tables are configured
    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    /// Load the schema from a JSON file.
    ///
    /// Returns `Ok(false)` when the file does not exist; the store is left
    /// untouched in that case.
    pub fn load_from_file(&self, path: &Path) -> Result<bool, TranslationError> {
        if !path.exists() {
            debug!("Schema file not found: {}", path.display());
            return Ok(false);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::SchemaParse(format!("failed to read {}: {}", path.display(), e))
        })?;

        self.update(SchemaPayload::Serialized(content))?;
        Ok(true)
    }
}

/*!
 * Common test utilities for the sqlwai test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use serde_json::{json, Value};
use tempfile::TempDir;

use sqlwai::providers::Provider;
use sqlwai::translation::{RetryPolicy, SchemaPayload, SchemaStore, SqlTranslator};

// Re-export the mock backends module
pub mod mock_backends;

/// Route library logs to the test harness output (`RUST_LOG=debug cargo test`)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A small schema in the shape callers send to `updateContext`
pub fn sample_schema() -> Value {
    json!({
        "usuario_usuario": {
            "id": "integer",
            "nome": "varchar",
            "email": "varchar",
            "data_criacao": "timestamp"
        },
        "pedido": {
            "id": "integer",
            "usuario_id": "integer",
            "valor": "numeric",
            "status": "varchar"
        }
    })
}

/// Writes `sample_schema()` to `schema.json` in `dir`
pub fn create_schema_file(dir: &Path) -> Result<PathBuf> {
    create_test_file(dir, "schema.json", &serde_json::to_string_pretty(&sample_schema())?)
}

/// A translator over `provider` with the sample schema loaded and no retry delay
pub fn translator_with_schema(provider: Arc<dyn Provider>, max_attempts: u32) -> SqlTranslator {
    let schema = Arc::new(SchemaStore::new());
    schema.update(SchemaPayload::Structured(sample_schema()))
        .expect("sample schema is an object");
    SqlTranslator::new(schema, provider, RetryPolicy::new(max_attempts, Duration::ZERO))
}

/// A translator over `provider` with an empty schema store
pub fn translator_without_schema(provider: Arc<dyn Provider>) -> SqlTranslator {
    SqlTranslator::new(
        Arc::new(SchemaStore::new()),
        provider,
        RetryPolicy::new(3, Duration::ZERO),
    )
}

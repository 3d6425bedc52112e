/*!
 * Integration tests for the full translation pipeline.
 *
 * Covers retry accounting, terminal outcomes and concurrent use of the
 * shared schema context.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};
use futures::future::join_all;
use serde_json::json;
use sqlwai::errors::{NoQueryReason, TranslationError};
use sqlwai::providers::mock::MockProvider;
use sqlwai::translation::{RetryPolicy, SchemaPayload, SchemaStore, SqlTranslator, TranslationOutcome};
use crate::common;

#[tokio::test]
async fn test_translate_withPersistentOutage_shouldStopAfterMaxAttempts() {
    common::init_logging();
    let provider = MockProvider::transient_failure();
    let translator = common::translator_with_schema(Arc::new(provider.clone()), 3);

    let result = translator.translate("quantos pedidos?").await;

    match result {
        Err(TranslationError::MaxRetriesExceeded { attempts, last_error }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("503"));
        }
        other => panic!("expected MaxRetriesExceeded, got {:?}", other),
    }
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_translate_withSingleOutage_shouldSucceedOnSecondAttempt() {
    let provider = MockProvider::failing_then(1, MockProvider::fenced("SELECT COUNT(*) FROM pedido"));
    let translator = common::translator_with_schema(Arc::new(provider.clone()), 3);

    let outcome = translator.translate("quantos pedidos?").await.unwrap();

    assert_eq!(outcome, TranslationOutcome::Query("SELECT COUNT(*) FROM pedido".to_string()));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_translate_withPermanentFailure_shouldNotRetry() {
    let provider = MockProvider::permanent_failure();
    let translator = common::translator_with_schema(Arc::new(provider.clone()), 5);

    let result = translator.translate("quantos pedidos?").await;

    assert!(matches!(result, Err(TranslationError::BackendPermanent(_))));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_translate_withMissingFence_shouldNotRetry() {
    let provider = MockProvider::responding("The answer is SELECT 1");
    let translator = common::translator_with_schema(Arc::new(provider.clone()), 3);

    let result = translator.translate("um").await;

    assert_eq!(result, Err(TranslationError::NoQueryFound(NoQueryReason::MissingFence)));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_translate_withRetryDelay_shouldWaitBetweenAttemptsOnly() {
    let provider = MockProvider::transient_failure();
    let schema = Arc::new(SchemaStore::new());
    schema.update(SchemaPayload::Structured(common::sample_schema())).unwrap();
    let translator = SqlTranslator::new(
        schema,
        Arc::new(provider.clone()),
        RetryPolicy::new(3, Duration::from_millis(40)),
    );

    let started = Instant::now();
    let _ = translator.translate("um").await;
    let elapsed = started.elapsed();

    // Two sleeps between three attempts, none after the last
    assert!(elapsed >= Duration::from_millis(80), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1000), "elapsed {:?}", elapsed);
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_translate_concurrentRequests_shouldAllComplete() {
    let provider = MockProvider::slow(20, MockProvider::fenced("SELECT nome FROM usuario_usuario"));
    let translator = Arc::new(common::translator_with_schema(Arc::new(provider.clone()), 3));

    let tasks = (0..16).map(|i| {
        let translator = Arc::clone(&translator);
        async move { translator.translate(&format!("pergunta {}", i)).await }
    });
    let results = join_all(tasks).await;

    assert!(results.iter().all(|r| matches!(r, Ok(TranslationOutcome::Query(_)))));
    assert_eq!(provider.call_count(), 16);
}

#[tokio::test]
async fn test_updateContext_duringTranslations_shouldSeeWholeSchemas() {
    let provider = MockProvider::slow(5, MockProvider::fenced("SELECT 1"));
    let translator = Arc::new(common::translator_with_schema(Arc::new(provider.clone()), 1));

    let old_schema = common::sample_schema();
    let new_schema = json!({"produto": {"sku": "varchar", "preco": "numeric"}});

    let mut handles = Vec::new();
    for i in 0..20 {
        let translator = Arc::clone(&translator);
        let payload = if i % 2 == 0 { new_schema.clone() } else { old_schema.clone() };
        handles.push(tokio::spawn(async move {
            if i % 4 == 0 {
                translator.update_context(SchemaPayload::Structured(payload)).map(|_| ())
            } else {
                translator.translate("quantos?").await.map(|_| ())
            }
        }));
    }

    for handle in handles {
        handle.await.expect("task panicked").expect("operation failed");
    }

    // Every prompt embeds exactly one complete schema, never a mix
    let prompt = provider.last_prompt().expect("at least one prompt");
    let has_old = prompt.contains("\"pedido\"");
    let has_new = prompt.contains("\"produto\"");
    assert!(has_old ^ has_new);
    assert_eq!(translator.schema().read().len(), 1);
}

//! ABOUTME: Integration tests for the Session Registry covering idempotence, quotas and atomicity
//! ABOUTME: Exercises cache coherence across a mutation/invalidation/read sequence

use std::sync::Arc;

use rlm_core::config::RlmConfig;
use serde_json::json;

use crate::registry::SessionRegistry;
use crate::types::AppendMode;

fn test_registry() -> Arc<SessionRegistry> {
    let mut config = RlmConfig::default();
    config.session.max_context_bytes = 1024;
    config.session.max_session_memory_bytes = 4096;
    config.session.max_contexts_per_session = 4;
    config.session.max_variables_per_session = 4;
    SessionRegistry::new(Arc::new(config))
}

#[tokio::test]
async fn load_is_idempotent() {
    let registry = test_registry();
    let sid = registry.create_session().await.unwrap();
    let first = registry.load(Some(sid.as_str()), "doc", "hello world".into()).await.unwrap();
    let second = registry.load(Some(sid.as_str()), "doc", "hello world".into()).await.unwrap();
    assert_eq!(first.metadata.length, second.metadata.length);
    assert_eq!(first.metadata.word_count, second.metadata.word_count);
    assert_eq!(first.content, second.content);
}

#[tokio::test]
async fn append_then_prepend_produce_expected_content() {
    let registry = test_registry();
    let sid = registry.create_session().await.unwrap();
    registry.load(Some(sid.as_str()), "doc", "middle".into()).await.unwrap();
    registry
        .append(Some(sid.as_str()), "doc", "-end", AppendMode::Append, false)
        .await
        .unwrap();
    let ctx = registry
        .append(Some(sid.as_str()), "doc", "start-", AppendMode::Prepend, false)
        .await
        .unwrap();
    assert_eq!(ctx.content, "start-middle-end");
}

#[tokio::test]
async fn oversized_context_is_rejected() {
    let registry = test_registry();
    let sid = registry.create_session().await.unwrap();
    let huge = "x".repeat(2000);
    let err = registry.load(Some(sid.as_str()), "doc", huge).await.unwrap_err();
    assert!(matches!(err, crate::error::SessionError::ContextTooLarge { .. }));
}

#[tokio::test]
async fn append_failure_leaves_prior_context_intact() {
    let registry = test_registry();
    let sid = registry.create_session().await.unwrap();
    registry.load(Some(sid.as_str()), "doc", "short".into()).await.unwrap();
    let huge = "y".repeat(2000);
    let err = registry
        .append(Some(sid.as_str()), "doc", &huge, AppendMode::Append, false)
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::SessionError::ContextTooLarge { .. }));
    let ctx = registry.get_context(Some(sid.as_str()), "doc").await.unwrap();
    assert_eq!(ctx.content, "short");
}

#[tokio::test]
async fn variable_names_are_validated() {
    let registry = test_registry();
    let sid = registry.create_session().await.unwrap();
    let err = registry
        .set_variable(Some(sid.as_str()), "__proto__", json!(1))
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::SessionError::InvalidInput { .. }));
    registry
        .set_variable(Some(sid.as_str()), "answer_draft", json!("hi"))
        .await
        .unwrap();
    let v = registry.get_variable(Some(sid.as_str()), "answer_draft").await.unwrap();
    assert_eq!(v, Some(json!("hi")));
}

#[tokio::test]
async fn decompose_lookup_falls_back_to_session_global() {
    let registry = test_registry();
    let sid = registry.create_session().await.unwrap();
    registry.load(Some(sid.as_str()), "a", "text a".into()).await.unwrap();
    let record = registry
        .store_decomposition(Some(sid.as_str()), "a", "fixed_size", json!({"chunkSize": 4}))
        .await
        .unwrap();

    let looked_up = registry
        .lookup_decomposition(Some(sid.as_str()), Some("missing-context"), None)
        .await
        .unwrap();
    assert_eq!(looked_up.id, record.id);
}

#[tokio::test]
async fn decompose_id_context_mismatch_is_rejected_unless_main() {
    let registry = test_registry();
    let sid = registry.create_session().await.unwrap();
    registry.load(Some(sid.as_str()), "a", "text a".into()).await.unwrap();
    let record = registry
        .store_decomposition(Some(sid.as_str()), "a", "fixed_size", json!({"chunkSize": 4}))
        .await
        .unwrap();

    let err = registry
        .lookup_decomposition(Some(sid.as_str()), Some("b"), Some(&record.id))
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::SessionError::InvalidInput { .. }));

    let ok = registry
        .lookup_decomposition(Some(sid.as_str()), Some("main"), Some(&record.id))
        .await
        .unwrap();
    assert_eq!(ok.id, record.id);
}

#[tokio::test]
async fn unload_then_get_context_fails() {
    let registry = test_registry();
    let sid = registry.create_session().await.unwrap();
    registry.load(Some(sid.as_str()), "doc", "hi".into()).await.unwrap();
    registry.unload(Some(sid.as_str()), "doc").await.unwrap();
    let err = registry.get_context(Some(sid.as_str()), "doc").await.unwrap_err();
    assert!(matches!(err, crate::error::SessionError::ContextNotFound { .. }));
}

#[tokio::test]
async fn default_session_is_always_available() {
    let registry = test_registry();
    let ctx = registry.load(None, "doc", "hello".into()).await.unwrap();
    assert_eq!(ctx.id, "doc");
    let stats = registry.stats(None).await.unwrap();
    assert_eq!(stats.id, "default");
}

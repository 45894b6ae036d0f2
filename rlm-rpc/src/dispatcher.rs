//! ABOUTME: The Dispatcher wires a SessionRegistry, a metrics registry and the chunk/index/query
//! ABOUTME: caches to the tool catalog, and routes a tool name + params to its handler

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use rlm_core::config::RlmConfig;
use rlm_decompose::cache::ChunkCache;
use rlm_rank::cache::{IndexCache, QueryCache};
use rlm_search::cache::SearchResultCache;
use rlm_search::regex_search::RegexMatch;
use rlm_search::substring_search::SubstringMatch;
use rlm_session::persistence::{FilePersistence, NullPersistence, PersistenceProvider};
use rlm_session::registry::SessionRegistry;

use crate::error::{envelope_for, RpcError};
use crate::metrics::Metrics;
use crate::tools;

/// Process-wide dependency bundle every tool handler is given a shared reference to.
///
/// Caches are registered with the registry in the order mandated by spec
/// section 4.1 (chunk-cache, index-cache, query-cache) so a mutation's
/// cascade of invalidation always reaches the coarsest cache first.
pub struct Dispatcher {
    pub registry: Arc<SessionRegistry>,
    pub config: Arc<RlmConfig>,
    pub metrics: Metrics,
    pub chunk_cache: Arc<ChunkCache>,
    pub index_cache: Arc<IndexCache>,
    pub rank_query_cache: Arc<QueryCache>,
    pub search_cache: Arc<SearchResultCache<Vec<RegexMatch>>>,
    pub find_all_cache: Arc<SearchResultCache<Vec<SubstringMatch>>>,
}

impl Dispatcher {
    /// Builds a fresh `Dispatcher`, choosing a persistence provider from
    /// `config.persistence` (file-backed when enabled, a no-op otherwise)
    /// and wiring every cache into the registry's invalidation list.
    pub fn new(config: RlmConfig) -> Self {
        let config = Arc::new(config);

        let persistence: Arc<dyn PersistenceProvider> = if config.persistence.enabled {
            let base_dir = config.persistence.base_dir.clone().unwrap_or_else(|| "rlm-data".to_string());
            match FilePersistence::new(base_dir, config.persistence.snapshots, config.persistence.max_snapshots) {
                Ok(provider) => Arc::new(provider),
                Err(err) => {
                    warn!(error = %err, "failed to initialize file persistence, falling back to no-op persistence");
                    Arc::new(NullPersistence)
                }
            }
        } else {
            Arc::new(NullPersistence)
        };

        let registry = SessionRegistry::with_persistence(Arc::clone(&config), persistence);

        let chunk_cache = Arc::new(ChunkCache::new(config.decompose.chunk_cache_max_entries, config.decompose.chunk_cache_max_bytes));
        let index_cache = Arc::new(IndexCache::new(config.rank.index_cache_max_entries));
        let rank_query_cache = Arc::new(QueryCache::new(config.rank.query_cache_max_entries));
        let search_cache = Arc::new(SearchResultCache::new(config.search.query_cache_max_entries));
        let find_all_cache = Arc::new(SearchResultCache::new(config.search.query_cache_max_entries));

        registry.register_cache(chunk_cache.clone());
        registry.register_cache(index_cache.clone());
        registry.register_cache(rank_query_cache.clone());
        registry.register_cache(search_cache.clone());
        registry.register_cache(find_all_cache.clone());

        registry.spawn_scavenger();

        Self {
            registry,
            config,
            metrics: Metrics::new(),
            chunk_cache,
            index_cache,
            rank_query_cache,
            search_cache,
            find_all_cache,
        }
    }

    /// Routes a tool name to its handler, catching both unknown-tool names
    /// and the handler's own typed error and turning either into the wire
    /// `ErrorEnvelope` shape. A handler's success payload passes through
    /// unchanged (every handler already shapes its own `{"success": true, ...}`).
    pub async fn dispatch(&self, tool: &str, params: Value) -> Value {
        self.metrics.incr("tool_calls_total");
        let result = self.dispatch_inner(tool, params).await;
        match result {
            Ok(value) => value,
            Err(err) => {
                self.metrics.incr("tool_calls_failed_total");
                serde_json::to_value(envelope_for(err)).unwrap_or_else(|_| {
                    serde_json::json!({
                        "error": true,
                        "code": rlm_core::envelope::ErrorCode::SystemInternal as u32,
                        "message": "failed to serialize error envelope",
                    })
                })
            }
        }
    }

    async fn dispatch_inner(&self, tool: &str, params: Value) -> crate::error::Result<Value> {
        match tool {
            "rlm_load_context" => tools::context::load_context(self, params).await,
            "rlm_append_context" => tools::context::append_context(self, params).await,
            "rlm_unload_context" => tools::context::unload_context(self, params).await,
            "rlm_get_context_info" => tools::context::get_context_info(self, params).await,
            "rlm_read_context" => tools::context::read_context(self, params).await,
            "rlm_list_contexts" => tools::context::list_contexts(self, params).await,
            "rlm_decompose_context" => tools::decompose::decompose_context(self, params).await,
            "rlm_get_chunks" => tools::decompose::get_chunks(self, params).await,
            "rlm_suggest_strategy" => tools::decompose::suggest_strategy(self, params).await,
            "rlm_search_context" => tools::search::search_context(self, params).await,
            "rlm_find_all" => tools::search::find_all(self, params).await,
            "rlm_rank_chunks" => tools::rank::rank_chunks_tool(self, params).await,
            "rlm_get_statistics" => tools::stats::get_statistics(self, params).await,
            "rlm_execute_code" => tools::sandbox::execute_code(self, params).await,
            "rlm_set_variable" => tools::variables::set_variable(self, params).await,
            "rlm_get_variable" => tools::variables::get_variable(self, params).await,
            "rlm_set_answer" => tools::variables::set_answer(self, params).await,
            "rlm_get_answer" => tools::variables::get_answer(self, params).await,
            "rlm_create_session" => tools::session::create_session(self, params).await,
            "rlm_get_session_info" => tools::session::get_session_info(self, params).await,
            "rlm_clear_session" => tools::session::clear_session(self, params).await,
            "rlm_get_metrics" => tools::metrics_tool::get_metrics(self, params).await,
            other => Err(RpcError::UnknownTool { name: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_tool_returns_error_envelope() {
        let dispatcher = Dispatcher::new(RlmConfig::default());
        let response = dispatcher.dispatch("rlm_does_not_exist", serde_json::json!({})).await;
        assert_eq!(response["error"], true);
        assert_eq!(response["code"], 1601);
    }

    #[tokio::test]
    async fn load_then_read_context_round_trips() {
        let dispatcher = Dispatcher::new(RlmConfig::default());
        let load = dispatcher
            .dispatch("rlm_load_context", serde_json::json!({"contextId": "doc1", "text": "hello world"}))
            .await;
        assert_eq!(load["success"], true);

        let read = dispatcher
            .dispatch("rlm_read_context", serde_json::json!({"contextId": "doc1"}))
            .await;
        assert_eq!(read["content"], "hello world");
    }

    #[tokio::test]
    async fn decomposed_chunks_are_framed_with_camel_case_offsets() {
        let dispatcher = Dispatcher::new(RlmConfig::default());
        dispatcher
            .dispatch("rlm_load_context", serde_json::json!({"contextId": "doc1", "text": "abcdefghij"}))
            .await;
        dispatcher
            .dispatch(
                "rlm_decompose_context",
                serde_json::json!({"contextId": "doc1", "strategy": "fixed_size", "options": {"chunkSize": 4, "overlap": 1}}),
            )
            .await;
        let fetched = dispatcher
            .dispatch("rlm_get_chunks", serde_json::json!({"contextId": "doc1"}))
            .await;

        let chunks = fetched["chunks"].as_array().unwrap();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0]["startOffset"], 0);
        assert_eq!(chunks[0]["endOffset"], 4);
        assert_eq!(chunks[0]["content"], "abcd");
        assert!(chunks[0].get("start_offset").is_none());
    }

    /// E5 from the testable-properties list: after an append, a prior
    /// decomposition's cached chunks are no longer reachable and the next
    /// decompose recomputes from the post-append content.
    #[tokio::test]
    async fn append_invalidates_the_chunk_cache() {
        let dispatcher = Dispatcher::new(RlmConfig::default());
        dispatcher
            .dispatch("rlm_load_context", serde_json::json!({"contextId": "doc1", "text": "hello"}))
            .await;
        let first = dispatcher
            .dispatch(
                "rlm_decompose_context",
                serde_json::json!({"contextId": "doc1", "strategy": "fixed_size", "options": {"chunkSize": 2, "overlap": 0}}),
            )
            .await;
        assert_eq!(first["chunkCount"], 3);

        dispatcher
            .dispatch("rlm_append_context", serde_json::json!({"contextId": "doc1", "text": " world", "mode": "append"}))
            .await;

        let second = dispatcher
            .dispatch(
                "rlm_decompose_context",
                serde_json::json!({"contextId": "doc1", "strategy": "fixed_size", "options": {"chunkSize": 2, "overlap": 0}}),
            )
            .await;
        assert_eq!(second["chunkCount"], 6);

        let fetched = dispatcher
            .dispatch("rlm_get_chunks", serde_json::json!({"contextId": "doc1"}))
            .await;
        let rebuilt: String = fetched["chunks"].as_array().unwrap().iter().map(|c| c["content"].as_str().unwrap()).collect();
        assert_eq!(rebuilt, "hello world");
    }

    /// E3 from the testable-properties list, exercised through the RPC surface.
    #[tokio::test]
    async fn rank_chunks_orders_by_bm25_score() {
        let dispatcher = Dispatcher::new(RlmConfig::default());
        dispatcher
            .dispatch(
                "rlm_load_context",
                serde_json::json!({"contextId": "doc1", "text": "the cat sat\n\ndogs bark\n\nthe cat and the cat"}),
            )
            .await;
        dispatcher
            .dispatch("rlm_decompose_context", serde_json::json!({"contextId": "doc1", "strategy": "by_paragraphs"}))
            .await;

        let ranked = dispatcher
            .dispatch("rlm_rank_chunks", serde_json::json!({"contextId": "doc1", "query": "cat"}))
            .await;
        let results = ranked["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["chunkIndex"], 2);
        assert_eq!(results[1]["chunkIndex"], 0);
    }

    /// spec.md:196: a failing sandboxed script still succeeds at the RPC
    /// layer (no `RpcError`), but the payload reports `success: false`.
    #[tokio::test]
    async fn failing_sandbox_execution_reports_success_false() {
        let dispatcher = Dispatcher::new(RlmConfig::default());
        let response = dispatcher.dispatch("rlm_execute_code", serde_json::json!({"code": "this is not valid js ("})).await;
        assert_eq!(response["success"], false);
        assert!(response["error"].as_str().is_some());

        let ok_response = dispatcher.dispatch("rlm_execute_code", serde_json::json!({"code": "print('ok')"})).await;
        assert_eq!(ok_response["success"], true);
    }
}

//! ABOUTME: Decomposer tools: rlm_decompose_context, rlm_get_chunks, rlm_suggest_strategy
//! ABOUTME: rlm_decompose_context always records a DecompositionRecord; rlm_get_chunks resolves one back

use serde::Deserialize;
use serde_json::{json, Value};

use rlm_core::hash::content_fingerprint;
use rlm_decompose::cache::cache_key;
use rlm_decompose::strategy::StrategyKind;
use rlm_session::types::SessionStats;

use crate::dispatcher::Dispatcher;
use crate::error::{parse_params, Result, RpcError};
use crate::metrics::{HistogramName, Timer};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct DecomposeContextParams {
    session_id: Option<String>,
    context_id: String,
    strategy: String,
    #[serde(default = "default_options")]
    options: Value,
}

fn default_options() -> Value {
    json!({})
}

pub async fn decompose_context(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: DecomposeContextParams = parse_params(params)?;
    let _timer = Timer::start(&dispatcher.metrics, HistogramName::DecomposeDuration);
    let strategy = StrategyKind::parse(&p.strategy)?;
    let sid = dispatcher.resolve_session_id(p.session_id.as_deref()).await?;
    let ctx = dispatcher.registry.get_context(Some(&sid), &p.context_id).await?;

    let chunks = dispatcher.decompose_cached(&sid, &p.context_id, &ctx.content, strategy, &p.options)?;
    let record = dispatcher
        .registry
        .store_decomposition(Some(&sid), &p.context_id, strategy.as_str(), p.options.clone())
        .await?;
    dispatcher.metrics.incr("decompositions_total");

    Ok(json!({
        "success": true,
        "decomposeId": record.id,
        "contextId": record.context_id,
        "strategy": record.strategy,
        "chunkCount": chunks.len(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct GetChunksParams {
    session_id: Option<String>,
    context_id: Option<String>,
    decompose_id: Option<String>,
    strategy: Option<String>,
    #[serde(default)]
    options: Option<Value>,
    #[serde(default)]
    indices: Option<Vec<usize>>,
}

pub async fn get_chunks(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: GetChunksParams = parse_params(params)?;
    let sid = dispatcher.resolve_session_id(p.session_id.as_deref()).await?;

    let record = dispatcher
        .registry
        .lookup_decomposition(Some(&sid), p.context_id.as_deref(), p.decompose_id.as_deref())
        .await?;

    // Open-question resolution (SPEC_FULL.md / DESIGN.md): when a caller supplies
    // `decompose_id` together with `strategy`/`options`, a mismatch is rejected
    // rather than silently ignored.
    if p.decompose_id.is_some() {
        if let Some(strategy) = &p.strategy {
            if strategy != &record.strategy {
                return Err(RpcError::invalid_input(format!(
                    "strategy '{strategy}' does not match decompose_id's recorded strategy '{}'",
                    record.strategy
                )));
            }
        }
        if let Some(options) = &p.options {
            if options != &record.options {
                return Err(RpcError::invalid_input(
                    "options do not match decompose_id's recorded options".to_string(),
                ));
            }
        }
    }

    let strategy = StrategyKind::parse(&record.strategy)?;
    let ctx = dispatcher.registry.get_context(Some(&sid), &record.context_id).await?;
    let chunks = dispatcher.decompose_cached(&sid, &record.context_id, &ctx.content, strategy, &record.options)?;

    let selected: Vec<_> = match &p.indices {
        Some(indices) => indices
            .iter()
            .filter_map(|i| chunks.get(*i).cloned())
            .collect(),
        None => chunks,
    };

    Ok(json!({
        "success": true,
        "decomposeId": record.id,
        "contextId": record.context_id,
        "strategy": record.strategy,
        "chunks": selected,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct SuggestStrategyParams {
    session_id: Option<String>,
    context_id: String,
}

pub async fn suggest_strategy(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: SuggestStrategyParams = parse_params(params)?;
    let ctx = dispatcher.registry.get_context(p.session_id.as_deref(), &p.context_id).await?;
    let suggestion = rlm_decompose::suggest::suggest_strategy(&ctx.content);
    Ok(json!({
        "success": true,
        "strategy": suggestion.strategy,
        "options": suggestion.options,
        "reason": suggestion.reason,
    }))
}

impl Dispatcher {
    /// Shared chunk-cache lookup/populate used by both `rlm_decompose_context`
    /// and `rlm_get_chunks`: a cache hit is returned only when the bound
    /// content-hash still matches the context's current text.
    pub(crate) fn decompose_cached(
        &self,
        session_id: &str,
        context_id: &str,
        content: &str,
        strategy: StrategyKind,
        options: &Value,
    ) -> Result<Vec<rlm_core::types::Chunk>> {
        let hash = content_fingerprint(content);
        let key = cache_key(session_id, context_id, strategy.as_str(), options);
        if let Some(cached) = self.chunk_cache.get(&key, &hash) {
            self.metrics.incr("cache_hits_chunk");
            return Ok(cached);
        }
        self.metrics.incr("cache_misses_chunk");
        let chunks = rlm_decompose::decompose(content, strategy, options, self.config.decompose.max_chunks)?;
        self.chunk_cache.put(key, hash, chunks.clone());
        Ok(chunks)
    }

    /// Resolves an optional caller session id, defaulting to `default` and
    /// confirming the session exists (or lazily creating `default`) before
    /// any cache-key work is done against it.
    pub(crate) async fn resolve_session_id(&self, session_id: Option<&str>) -> Result<String> {
        let stats: SessionStats = self.registry.stats(session_id).await?;
        Ok(stats.id)
    }
}

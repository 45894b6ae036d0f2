//! ABOUTME: rlm_rank_chunks: BM25-ranks a decomposition's chunks against a query, via rlm-rank's two-tier cache
//! ABOUTME: Resolves its decomposition the same way rlm_get_chunks does (decompose_id, or use_last_decompose)

use serde::Deserialize;
use serde_json::{json, Value};

use rlm_core::hash::content_fingerprint;
use rlm_decompose::strategy::StrategyKind;
use rlm_rank::tokenizer::TokenizerMode;
use rlm_rank::{rank_chunks, validate_query, RankRequest};

use crate::dispatcher::Dispatcher;
use crate::error::{parse_params, Result, RpcError};
use crate::metrics::HistogramName;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RankChunksParams {
    session_id: Option<String>,
    context_id: Option<String>,
    decompose_id: Option<String>,
    query: String,
    #[serde(default = "default_top_k_marker")]
    top_k: Option<usize>,
    #[serde(default)]
    min_score: f64,
    #[serde(default)]
    tokenizer: Option<String>,
}

fn default_top_k_marker() -> Option<usize> {
    None
}

pub async fn rank_chunks_tool(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: RankChunksParams = parse_params(params)?;
    let _timer = crate::metrics::Timer::start(&dispatcher.metrics, HistogramName::ToolDuration);
    validate_query(&p.query)?;

    let sid = dispatcher.resolve_session_id(p.session_id.as_deref()).await?;
    let record = dispatcher
        .registry
        .lookup_decomposition(Some(&sid), p.context_id.as_deref(), p.decompose_id.as_deref())
        .await?;

    let strategy = StrategyKind::parse(&record.strategy)?;
    let ctx = dispatcher.registry.get_context(Some(&sid), &record.context_id).await?;
    let hash = content_fingerprint(&ctx.content);

    let tokenizer_mode = match p.tokenizer.as_deref() {
        None => TokenizerMode::default(),
        Some(name) => TokenizerMode::parse(name)
            .ok_or_else(|| RpcError::invalid_input(format!("unknown tokenizer mode: {name}")))?,
    };

    let request = RankRequest {
        query: &p.query,
        top_k: p.top_k.unwrap_or(dispatcher.config.rank.default_top_k),
        min_score: p.min_score,
        tokenizer_mode,
    };

    let content_clone = ctx.content.clone();
    let strategy_owned = strategy;
    let options_clone = record.options.clone();
    let ranked = rank_chunks(
        &dispatcher.index_cache,
        &dispatcher.rank_query_cache,
        &sid,
        &record.context_id,
        record.strategy.as_str(),
        &record.options,
        &hash,
        || rlm_decompose::decompose(&content_clone, strategy_owned, &options_clone, dispatcher.config.decompose.max_chunks).unwrap_or_default(),
        &request,
        dispatcher.config.rank.k1,
        dispatcher.config.rank.b,
    );
    dispatcher.metrics.incr("index_queries");

    Ok(json!({
        "success": true,
        "decomposeId": record.id,
        "results": ranked,
    }))
}

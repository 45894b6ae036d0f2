//! ABOUTME: rlm_get_statistics: structural stats of a context plus the observable suggestStrategy thresholds
//! ABOUTME: Exposing the thresholds here keeps them tunable and observable rather than opaque constants

use serde::Deserialize;
use serde_json::{json, Value};

use rlm_decompose::suggest;

use crate::dispatcher::Dispatcher;
use crate::error::{parse_params, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct GetStatisticsParams {
    session_id: Option<String>,
    context_id: String,
}

pub async fn get_statistics(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: GetStatisticsParams = parse_params(params)?;
    let ctx = dispatcher.registry.get_context(p.session_id.as_deref(), &p.context_id).await?;
    let content = &ctx.content;

    let paragraph_count = content.split("\n\n").filter(|s| !s.trim().is_empty()).count();
    let sentence_count = content.matches(['.', '!', '?']).count();

    Ok(json!({
        "success": true,
        "contextId": ctx.id,
        "metadata": ctx.metadata,
        "paragraphCount": paragraph_count,
        "sentenceCount": sentence_count,
        "suggestStrategyThresholds": {
            "largeTextLenThreshold": suggest::LARGE_TEXT_LEN_THRESHOLD,
            "manyParagraphsThreshold": suggest::MANY_PARAGRAPHS_THRESHOLD,
            "manyLinesThreshold": suggest::MANY_LINES_THRESHOLD,
            "defaultFixedChunkSize": suggest::DEFAULT_FIXED_CHUNK_SIZE,
        },
    }))
}

//! ABOUTME: Context-lifecycle tools: rlm_load_context, rlm_append_context, rlm_unload_context, rlm_get_context_info, rlm_read_context
//! ABOUTME: Every mutator here routes through `SessionRegistry` so cache invalidation stays centralized

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use rlm_session::types::AppendMode;

use crate::dispatcher::Dispatcher;
use crate::error::{parse_params, Result, RpcError};
use crate::metrics::{HistogramName, Timer};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct LoadContextParams {
    session_id: Option<String>,
    context_id: String,
    text: String,
}

pub async fn load_context(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: LoadContextParams = parse_params(params)?;
    let _timer = Timer::start(&dispatcher.metrics, HistogramName::LoadContextDuration);
    let ctx = dispatcher.registry.load(p.session_id.as_deref(), &p.context_id, p.text).await?;
    dispatcher.metrics.incr("contexts_loaded");
    Ok(json!({
        "success": true,
        "contextId": ctx.id,
        "metadata": ctx.metadata,
        "createdAt": ctx.created_at,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct AppendContextParams {
    session_id: Option<String>,
    context_id: String,
    text: String,
    #[serde(default)]
    mode: AppendModeParam,
    #[serde(default = "default_true")]
    create_if_missing: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum AppendModeParam {
    #[default]
    Append,
    Prepend,
}

impl From<AppendModeParam> for AppendMode {
    fn from(value: AppendModeParam) -> Self {
        match value {
            AppendModeParam::Append => AppendMode::Append,
            AppendModeParam::Prepend => AppendMode::Prepend,
        }
    }
}

pub async fn append_context(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: AppendContextParams = parse_params(params)?;
    let _timer = Timer::start(&dispatcher.metrics, HistogramName::AppendContextDuration);
    let ctx = dispatcher
        .registry
        .append(p.session_id.as_deref(), &p.context_id, &p.text, p.mode.into(), p.create_if_missing)
        .await?;
    dispatcher.metrics.incr("contexts_appended");
    Ok(json!({
        "success": true,
        "contextId": ctx.id,
        "metadata": ctx.metadata,
        "createdAt": ctx.created_at,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct UnloadContextParams {
    session_id: Option<String>,
    context_id: String,
}

pub async fn unload_context(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: UnloadContextParams = parse_params(params)?;
    dispatcher.registry.unload(p.session_id.as_deref(), &p.context_id).await?;
    dispatcher.metrics.incr("contexts_unloaded");
    Ok(json!({"success": true}))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct GetContextInfoParams {
    session_id: Option<String>,
    context_id: String,
    #[serde(default)]
    preview_chars: Option<usize>,
}

pub async fn get_context_info(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: GetContextInfoParams = parse_params(params)?;
    let ctx = dispatcher.registry.get_context(p.session_id.as_deref(), &p.context_id).await?;
    let preview = p.preview_chars.map(|n| ctx.content.chars().take(n).collect::<String>());
    Ok(json!({
        "success": true,
        "contextId": ctx.id,
        "metadata": ctx.metadata,
        "createdAt": ctx.created_at,
        "preview": preview,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct ReadContextParams {
    session_id: Option<String>,
    context_id: String,
    #[serde(default)]
    start_offset: Option<usize>,
    #[serde(default)]
    end_offset: Option<usize>,
    #[serde(default)]
    start_line: Option<usize>,
    #[serde(default)]
    end_line: Option<usize>,
}

pub async fn read_context(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: ReadContextParams = parse_params(params)?;
    let ctx = dispatcher.registry.get_context(p.session_id.as_deref(), &p.context_id).await?;
    let content = &ctx.content;

    let slice = if p.start_line.is_some() || p.end_line.is_some() {
        let lines: Vec<&str> = content.lines().collect();
        let start = p.start_line.unwrap_or(1).max(1) - 1;
        let end = p.end_line.unwrap_or(lines.len()).min(lines.len());
        if start >= end {
            String::new()
        } else {
            lines[start..end].join("\n")
        }
    } else {
        let start = p.start_offset.unwrap_or(0).min(content.len());
        let end = p.end_offset.unwrap_or(content.len()).clamp(start, content.len());
        let start = round_to_char_boundary(content, start);
        let end = round_to_char_boundary(content, end);
        content[start..end].to_string()
    };

    Ok(json!({
        "success": true,
        "contextId": ctx.id,
        "content": slice,
    }))
}

fn round_to_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx.min(text.len())
}

pub async fn list_contexts(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    struct Params {
        session_id: Option<String>,
    }
    let p: Params = parse_params(params)?;
    let ids = dispatcher.registry.list_contexts(p.session_id.as_deref()).await?;
    Ok(json!({"success": true, "contextIds": ids}))
}

/// Shared helper other tool modules use to reject obviously-empty fields
/// before they reach the session registry (e.g. an empty `query` string).
pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RpcError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}

//! ABOUTME: rlm_execute_code: runs a sandboxed snippet; the RPC call itself never errors out
//! ABOUTME: A failing or timed-out script surfaces as `success: false` in the payload, never as an RpcError

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use rlm_session::types::ExecutionRecord;

use crate::dispatcher::Dispatcher;
use crate::error::{parse_params, Result};
use crate::metrics::{HistogramName, Timer};

const CODE_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct ExecuteCodeParams {
    session_id: Option<String>,
    code: String,
}

pub async fn execute_code(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: ExecuteCodeParams = parse_params(params)?;
    let _timer = Timer::start(&dispatcher.metrics, HistogramName::CodeExecutionDuration);

    let sid = dispatcher.resolve_session_id(p.session_id.as_deref()).await?;
    let runtime = tokio::runtime::Handle::current();
    let registry = dispatcher.registry.clone();
    let code = p.code.clone();
    let config = dispatcher.config.sandbox.clone();
    let session_for_run = sid.clone();

    // The sandbox's own timeout guard blocks a dedicated OS thread; run it
    // via spawn_blocking so this call never occupies a tokio worker thread
    // for the full execution budget.
    let outcome = tokio::task::spawn_blocking(move || rlm_sandbox::engine::execute(&code, registry, session_for_run, runtime, &config))
        .await
        .map_err(|e| crate::error::RpcError::invalid_input(format!("sandbox task panicked: {e}")))?;

    dispatcher.metrics.incr("code_executions");
    if outcome.error.is_some() {
        dispatcher.metrics.incr("code_execution_errors");
    }

    let record = ExecutionRecord {
        id: Uuid::new_v4().to_string(),
        code_preview: p.code.chars().take(CODE_PREVIEW_CHARS).collect(),
        output: outcome.output.clone(),
        error: outcome.error.clone(),
        duration_ms: outcome.duration_ms,
        executed_at: Utc::now(),
    };
    dispatcher.registry.push_history(Some(&sid), record.clone()).await?;

    Ok(json!({
        "success": outcome.error.is_none(),
        "output": outcome.output,
        "error": outcome.error,
        "durationMs": outcome.duration_ms,
    }))
}

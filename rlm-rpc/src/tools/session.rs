//! ABOUTME: Session lifecycle tools: rlm_create_session, rlm_get_session_info, rlm_clear_session
//! ABOUTME: Destruction (`destroy`) is a registry operation but not exposed as a tool; clear() is what clients get

use serde::Deserialize;
use serde_json::{json, Value};

use crate::dispatcher::Dispatcher;
use crate::error::{parse_params, Result};

pub async fn create_session(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Params {}
    let _: Params = parse_params(params)?;
    let id = dispatcher.registry.create_session().await?;
    dispatcher.metrics.incr("sessions_created");
    Ok(json!({"success": true, "sessionId": id.as_str()}))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct SessionIdParams {
    session_id: Option<String>,
}

pub async fn get_session_info(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: SessionIdParams = parse_params(params)?;
    let stats = dispatcher.registry.stats(p.session_id.as_deref()).await?;
    Ok(json!({"success": true, "stats": stats}))
}

pub async fn clear_session(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: SessionIdParams = parse_params(params)?;
    dispatcher.registry.clear(p.session_id.as_deref()).await?;
    dispatcher.metrics.incr("sessions_cleared");
    Ok(json!({"success": true}))
}

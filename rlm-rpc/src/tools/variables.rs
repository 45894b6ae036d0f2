//! ABOUTME: Session-scoped variable and AnswerState tools: rlm_set/get_variable, rlm_set/get_answer
//! ABOUTME: Name validation happens inside SessionRegistry; this layer only shapes params and responses

use serde::Deserialize;
use serde_json::{json, Value};

use crate::dispatcher::Dispatcher;
use crate::error::{parse_params, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct SetVariableParams {
    session_id: Option<String>,
    name: String,
    value: Value,
}

pub async fn set_variable(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: SetVariableParams = parse_params(params)?;
    dispatcher.registry.set_variable(p.session_id.as_deref(), &p.name, p.value).await?;
    Ok(json!({"success": true}))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct GetVariableParams {
    session_id: Option<String>,
    name: String,
}

pub async fn get_variable(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: GetVariableParams = parse_params(params)?;
    let value = dispatcher.registry.get_variable(p.session_id.as_deref(), &p.name).await?;
    Ok(json!({"success": true, "value": value}))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct SetAnswerParams {
    session_id: Option<String>,
    content: String,
    #[serde(default)]
    ready: bool,
}

pub async fn set_answer(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: SetAnswerParams = parse_params(params)?;
    dispatcher.registry.set_answer(p.session_id.as_deref(), p.content, p.ready).await?;
    Ok(json!({"success": true}))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct GetAnswerParams {
    session_id: Option<String>,
}

pub async fn get_answer(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: GetAnswerParams = parse_params(params)?;
    let answer = dispatcher.registry.get_answer(p.session_id.as_deref()).await?;
    Ok(json!({"success": true, "content": answer.content, "ready": answer.ready}))
}

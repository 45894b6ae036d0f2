//! ABOUTME: Read-only context access: getContext, getContextMetadata, listContexts
//! ABOUTME: All three return null/empty on failure rather than throwing; a missing id is not a script error

use std::rc::Rc;

use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction};
use serde_json::json;

use crate::conv::arg_string_or_default;
use crate::host::SandboxHost;

pub fn install(context: &mut Context, host: &Rc<SandboxHost>) {
    let get_context_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("getContext"),
            1,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let id = arg_string_or_default(args, 0);
                let result = get_context_host.block_on(get_context_host.registry.get_context(Some(&get_context_host.session_id), &id));
                match result {
                    Ok(context) => Ok(JsValue::from_json(&json!({"id": context.id, "content": context.content}), ctx)?),
                    Err(_) => Ok(JsValue::null()),
                }
            }),
        )
        .expect("getContext is not already registered");

    let get_metadata_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("getContextMetadata"),
            1,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let id = arg_string_or_default(args, 0);
                let result = get_metadata_host.block_on(get_metadata_host.registry.get_context(Some(&get_metadata_host.session_id), &id));
                match result {
                    Ok(context) => Ok(JsValue::from_json(&serde_json::to_value(&context.metadata).unwrap_or(serde_json::Value::Null), ctx)?),
                    Err(_) => Ok(JsValue::null()),
                }
            }),
        )
        .expect("getContextMetadata is not already registered");

    let list_contexts_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("listContexts"),
            0,
            NativeFunction::from_closure(move |_this, _args, ctx| -> JsResult<JsValue> {
                let ids = list_contexts_host
                    .block_on(list_contexts_host.registry.list_contexts(Some(&list_contexts_host.session_id)))
                    .unwrap_or_default();
                Ok(JsValue::from_json(&json!(ids), ctx)?)
            }),
        )
        .expect("listContexts is not already registered");
}

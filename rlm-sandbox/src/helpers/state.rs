//! ABOUTME: Session state helpers wired straight to the live SessionRegistry: setVar/getVar/listVars/deleteVar, answer helpers
//! ABOUTME: setVar silently ignores invalid names rather than throwing, per the error-absorbing helper contract

use std::rc::Rc;

use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction};
use serde_json::json;

use crate::conv::{arg_bool, arg_string_or_default, js_to_json};
use crate::host::SandboxHost;

pub fn install(context: &mut Context, host: &Rc<SandboxHost>) {
    let set_var_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("setVar"),
            2,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let name = arg_string_or_default(args, 0);
                let value = js_to_json(args.get(1).unwrap_or(&JsValue::undefined()), ctx);
                let _ = set_var_host.block_on(set_var_host.registry.set_variable(Some(&set_var_host.session_id), &name, value));
                Ok(JsValue::undefined())
            }),
        )
        .expect("setVar is not already registered");

    let get_var_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("getVar"),
            1,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let name = arg_string_or_default(args, 0);
                let result = get_var_host.block_on(get_var_host.registry.get_variable(Some(&get_var_host.session_id), &name));
                match result {
                    Ok(Some(value)) => Ok(JsValue::from_json(&value, ctx)?),
                    _ => Ok(JsValue::null()),
                }
            }),
        )
        .expect("getVar is not already registered");

    let list_vars_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("listVars"),
            0,
            NativeFunction::from_closure(move |_this, _args, ctx| -> JsResult<JsValue> {
                let vars = list_vars_host.block_on(list_vars_host.registry.list_variables(Some(&list_vars_host.session_id))).unwrap_or_default();
                let obj: serde_json::Map<String, serde_json::Value> = vars.into_iter().collect();
                Ok(JsValue::from_json(&serde_json::Value::Object(obj), ctx)?)
            }),
        )
        .expect("listVars is not already registered");

    let delete_var_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("deleteVar"),
            1,
            NativeFunction::from_closure(move |_this, args, _ctx| -> JsResult<JsValue> {
                let name = arg_string_or_default(args, 0);
                let _ = delete_var_host.block_on(delete_var_host.registry.delete_variable(Some(&delete_var_host.session_id), &name));
                Ok(JsValue::undefined())
            }),
        )
        .expect("deleteVar is not already registered");

    let set_answer_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("setAnswer"),
            2,
            NativeFunction::from_closure(move |_this, args, _ctx| -> JsResult<JsValue> {
                let content = arg_string_or_default(args, 0);
                let ready = arg_bool(args, 1, false);
                let _ = set_answer_host.block_on(set_answer_host.registry.set_answer(Some(&set_answer_host.session_id), content, ready));
                Ok(JsValue::undefined())
            }),
        )
        .expect("setAnswer is not already registered");

    let get_answer_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("getAnswer"),
            0,
            NativeFunction::from_closure(move |_this, _args, ctx| -> JsResult<JsValue> {
                let answer = get_answer_host.block_on(get_answer_host.registry.get_answer(Some(&get_answer_host.session_id))).unwrap_or_default();
                Ok(JsValue::from_json(&json!({"content": answer.content, "ready": answer.ready}), ctx)?)
            }),
        )
        .expect("getAnswer is not already registered");

    let append_answer_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("appendAnswer"),
            1,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let content = arg_string_or_default(args, 0);
                let answer = append_answer_host
                    .block_on(append_answer_host.registry.append_answer(Some(&append_answer_host.session_id), &content))
                    .unwrap_or_default();
                Ok(JsValue::from_json(&json!({"content": answer.content, "ready": answer.ready}), ctx)?)
            }),
        )
        .expect("appendAnswer is not already registered");
}

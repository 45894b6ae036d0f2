//! ABOUTME: jsonParse/jsonStringify: wrappers around serde_json that return null instead of throwing
//! ABOUTME: Distinct from the engine's native JSON global, which scripts can still use directly

use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction};

use crate::conv::{arg_string_or_default, js_to_json};

pub fn install(context: &mut Context) {
    context
        .register_global_callable(
            js_string!("jsonParse"),
            1,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let text = arg_string_or_default(args, 0);
                match serde_json::from_str::<serde_json::Value>(&text) {
                    Ok(value) => Ok(JsValue::from_json(&value, ctx)?),
                    Err(_) => Ok(JsValue::null()),
                }
            }),
        )
        .expect("jsonParse is not already registered");

    context
        .register_global_callable(
            js_string!("jsonStringify"),
            1,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let value = js_to_json(args.first().unwrap_or(&JsValue::undefined()), ctx);
                match serde_json::to_string(&value) {
                    Ok(text) => Ok(JsValue::from(js_string!(text.as_str()))),
                    Err(_) => Ok(JsValue::null()),
                }
            }),
        )
        .expect("jsonStringify is not already registered");
}

//! ABOUTME: JsValue <-> serde_json::Value conversion helpers shared by every native function
//! ABOUTME: Every helper in this crate is error-absorbing, so these return Option/default rather than JsResult

use boa_engine::{Context, JsValue};
use rlm_core::types::Value;

#[must_use]
pub fn arg_string(args: &[JsValue], index: usize) -> Option<String> {
    args.get(index).and_then(JsValue::as_string).map(|s| s.to_std_string_escaped())
}

#[must_use]
pub fn arg_string_or_default(args: &[JsValue], index: usize) -> String {
    arg_string(args, index).unwrap_or_default()
}

#[must_use]
pub fn arg_usize(args: &[JsValue], index: usize) -> Option<usize> {
    args.get(index).and_then(JsValue::as_number).filter(|n| *n >= 0.0).map(|n| n as usize)
}

#[must_use]
pub fn arg_bool(args: &[JsValue], index: usize, default: bool) -> bool {
    args.get(index).map(JsValue::to_boolean).unwrap_or(default)
}

/// Converts a JS value to a JSON value, returning `Value::Null` on any
/// conversion failure (host helpers never throw for a bad argument).
#[must_use]
pub fn js_to_json(value: &JsValue, context: &mut Context) -> Value {
    value.to_json(context).unwrap_or(Value::Null)
}

/// Converts a JSON value into a JS value, falling back to `undefined` if
/// the value somehow cannot be represented (should not happen for plain
/// JSON produced by this crate).
#[must_use]
pub fn json_to_js(value: &Value, context: &mut Context) -> JsValue {
    JsValue::from_json(value, context).unwrap_or(JsValue::undefined())
}

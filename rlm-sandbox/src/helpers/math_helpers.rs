//! ABOUTME: sum/avg over a JS array of numbers, the two math helpers the built-in Math object lacks
//! ABOUTME: Non-numeric entries are skipped rather than producing NaN, so a mixed array degrades gracefully

use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction};

fn numeric_entries(value: &JsValue, context: &mut Context) -> Vec<f64> {
    let Some(object) = value.as_object() else {
        return Vec::new();
    };
    let Ok(length) = object.length_of_array_like(context) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(length as usize);
    for i in 0..length {
        if let Ok(item) = object.get(i, context) {
            if let Some(n) = item.as_number() {
                out.push(n);
            }
        }
    }
    out
}

pub fn install(context: &mut Context) {
    context
        .register_global_callable(
            js_string!("sum"),
            1,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let values = numeric_entries(args.first().unwrap_or(&JsValue::undefined()), ctx);
                Ok(JsValue::from(values.iter().sum::<f64>()))
            }),
        )
        .expect("sum is not already registered");

    context
        .register_global_callable(
            js_string!("avg"),
            1,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let values = numeric_entries(args.first().unwrap_or(&JsValue::undefined()), ctx);
                if values.is_empty() {
                    return Ok(JsValue::from(0.0));
                }
                Ok(JsValue::from(values.iter().sum::<f64>() / values.len() as f64))
            }),
        )
        .expect("avg is not already registered");
}

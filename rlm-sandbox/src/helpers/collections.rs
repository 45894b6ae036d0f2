//! ABOUTME: Array helpers the standard library doesn't have: range (size-capped), chunk, take, skip, unique, groupBy
//! ABOUTME: map/filter/reduce/sort/slice/flatten already exist as native Array.prototype methods in boa

use boa_engine::object::builtins::JsArray;
use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction};

use crate::conv::arg_usize;

fn array_items(value: &JsValue, context: &mut Context) -> Vec<JsValue> {
    let Some(object) = value.as_object() else {
        return Vec::new();
    };
    let Ok(length) = object.length_of_array_like(context) else {
        return Vec::new();
    };
    (0..length).filter_map(|i| object.get(i, context).ok()).collect()
}

fn to_json_key(value: &JsValue, context: &mut Context) -> String {
    value.to_json(context).map(|v| v.to_string()).unwrap_or_default()
}

pub fn install(context: &mut Context, range_size_cap: usize) {
    context
        .register_global_callable(
            js_string!("range"),
            3,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let (start, end) = if args.len() >= 2 {
                    (arg_usize(args, 0).unwrap_or(0) as i64, arg_usize(args, 1).unwrap_or(0) as i64)
                } else {
                    (0, arg_usize(args, 0).unwrap_or(0) as i64)
                };
                let step = arg_usize(args, 2).unwrap_or(1).max(1) as i64;

                let mut values = Vec::new();
                let mut cur = start;
                while cur < end && values.len() < range_size_cap {
                    values.push(JsValue::from(cur as f64));
                    cur += step;
                }
                Ok(JsArray::from_iter(values, ctx).into())
            }),
        )
        .expect("range is not already registered");

    context
        .register_global_callable(
            js_string!("chunk"),
            2,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let items = array_items(args.first().unwrap_or(&JsValue::undefined()), ctx);
                let size = arg_usize(args, 1).unwrap_or(1).max(1);
                let groups: Vec<JsValue> = items.chunks(size).map(|group| JsArray::from_iter(group.to_vec(), ctx).into()).collect();
                Ok(JsArray::from_iter(groups, ctx).into())
            }),
        )
        .expect("chunk is not already registered");

    context
        .register_global_callable(
            js_string!("take"),
            2,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let items = array_items(args.first().unwrap_or(&JsValue::undefined()), ctx);
                let n = arg_usize(args, 1).unwrap_or(0);
                Ok(JsArray::from_iter(items.into_iter().take(n), ctx).into())
            }),
        )
        .expect("take is not already registered");

    context
        .register_global_callable(
            js_string!("skip"),
            2,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let items = array_items(args.first().unwrap_or(&JsValue::undefined()), ctx);
                let n = arg_usize(args, 1).unwrap_or(0);
                Ok(JsArray::from_iter(items.into_iter().skip(n), ctx).into())
            }),
        )
        .expect("skip is not already registered");

    context
        .register_global_callable(
            js_string!("unique"),
            1,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let items = array_items(args.first().unwrap_or(&JsValue::undefined()), ctx);
                let mut seen = std::collections::HashSet::new();
                let mut out = Vec::new();
                for item in items {
                    let key = to_json_key(&item, ctx);
                    if seen.insert(key) {
                        out.push(item);
                    }
                }
                Ok(JsArray::from_iter(out, ctx).into())
            }),
        )
        .expect("unique is not already registered");

    context
        .register_global_callable(
            js_string!("groupBy"),
            2,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let items = array_items(args.first().unwrap_or(&JsValue::undefined()), ctx);
                let key_fn = args.get(1).cloned().unwrap_or(JsValue::undefined());

                let mut groups: Vec<(String, Vec<JsValue>)> = Vec::new();
                for item in items {
                    let key = match ctx.call(&key_fn, &JsValue::undefined(), &[item.clone()]) {
                        Ok(k) => k.to_string(ctx).map(|s| s.to_std_string_escaped()).unwrap_or_default(),
                        Err(_) => "undefined".to_string(),
                    };
                    match groups.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, bucket)) => bucket.push(item),
                        None => groups.push((key, vec![item])),
                    }
                }

                let built: Vec<(String, JsValue)> = groups
                    .into_iter()
                    .map(|(key, bucket)| (key, JsArray::from_iter(bucket, ctx).into()))
                    .collect();

                let mut object = boa_engine::object::ObjectInitializer::new(ctx);
                for (key, array) in built {
                    object.property(js_string!(key), array, boa_engine::property::Attribute::all());
                }
                Ok(object.build().into())
            }),
        )
        .expect("groupBy is not already registered");
}

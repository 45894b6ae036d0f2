//! ABOUTME: Regex helpers exposed to scripts: search, findAll, replace, test — all error-absorbing
//! ABOUTME: search/findAll delegate to the Searcher's own enumeration so the two surfaces never drift apart

use std::rc::Rc;
use std::time::Duration;

use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction};
use rlm_core::redos::validate_and_compile;
use rlm_search::regex_search::{search as searcher_search, RegexSearchOptions};
use serde_json::json;

use crate::conv::arg_string_or_default;
use crate::host::SandboxHost;

pub fn install(context: &mut Context, host: &Rc<SandboxHost>) {
    context
        .register_global_callable(
            js_string!("regexTest"),
            2,
            NativeFunction::from_closure(move |_this, args, _ctx| -> JsResult<JsValue> {
                let text = arg_string_or_default(args, 0);
                let pattern = arg_string_or_default(args, 1);
                let matched = validate_and_compile(&pattern).map(|re| re.is_match(&text)).unwrap_or(false);
                Ok(JsValue::from(matched))
            }),
        )
        .expect("regexTest is not already registered");

    context
        .register_global_callable(
            js_string!("regexSearch"),
            2,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let text = arg_string_or_default(args, 0);
                let pattern = arg_string_or_default(args, 1);
                let options = RegexSearchOptions {
                    max_matches: 1,
                    budget: Duration::from_secs(3600),
                    context_chars: 0,
                    compact: true,
                };
                match searcher_search(&text, &pattern, &options) {
                    Ok(matches) if !matches.is_empty() => {
                        let m = &matches[0];
                        Ok(JsValue::from_json(&json!({"match": m.matched_text, "offset": m.offset, "line": m.line}), ctx)?)
                    }
                    _ => Ok(JsValue::null()),
                }
            }),
        )
        .expect("regexSearch is not already registered");

    let find_all_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("regexFindAll"),
            2,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let text = arg_string_or_default(args, 0);
                let pattern = arg_string_or_default(args, 1);
                let options = RegexSearchOptions {
                    max_matches: find_all_host.find_all_cap,
                    budget: Duration::from_secs(3600),
                    context_chars: 0,
                    compact: true,
                };
                let results = searcher_search(&text, &pattern, &options).unwrap_or_default();
                let payload: Vec<_> = results
                    .iter()
                    .map(|m| json!({"match": m.matched_text, "offset": m.offset, "line": m.line}))
                    .collect();
                Ok(JsValue::from_json(&json!(payload), ctx)?)
            }),
        )
        .expect("regexFindAll is not already registered");

    context
        .register_global_callable(
            js_string!("regexReplace"),
            3,
            NativeFunction::from_closure(move |_this, args, _ctx| -> JsResult<JsValue> {
                let text = arg_string_or_default(args, 0);
                let pattern = arg_string_or_default(args, 1);
                let replacement = arg_string_or_default(args, 2);
                let replaced = validate_and_compile(&pattern)
                    .map(|re| re.replace_all(&text, replacement.as_str()).into_owned())
                    .unwrap_or(text);
                Ok(JsValue::from(js_string!(replaced.as_str())))
            }),
        )
        .expect("regexReplace is not already registered");
}

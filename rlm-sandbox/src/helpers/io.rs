//! ABOUTME: print() and a logger-style object, both capturing into the bounded OutputBuffer
//! ABOUTME: No other I/O surface exists: no fs, no network, no process, nothing reaches outside the buffer

use std::rc::Rc;

use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction};

use crate::host::SandboxHost;

fn join_args(args: &[JsValue], context: &mut Context) -> String {
    args.iter()
        .map(|v| v.to_string(context).map(|s| s.to_std_string_escaped()).unwrap_or_else(|_| "<unprintable>".to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn log_with_level(level: &'static str, host: &Rc<SandboxHost>, args: &[JsValue], context: &mut Context) {
    let line = format!("[{level}] {}", join_args(args, context));
    host.output.push_line(&line);
}

pub fn install(context: &mut Context, host: &Rc<SandboxHost>) {
    let print_host = Rc::clone(host);
    context
        .register_global_callable(
            js_string!("print"),
            0,
            NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                let line = join_args(args, ctx);
                print_host.output.push_line(&line);
                Ok(JsValue::undefined())
            }),
        )
        .expect("print is not already registered");

    for level in ["info", "warn", "error", "debug"] {
        let level_host = Rc::clone(host);
        context
            .register_global_callable(
                js_string!(format!("log_{level}")),
                0,
                NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
                    log_with_level(level, &level_host, args, ctx);
                    Ok(JsValue::undefined())
                }),
            )
            .expect("log_<level> is not already registered");
    }

    // Assembles `logger.info(...)` etc. out of the flat `log_<level>` globals
    // so script authors get the familiar object shape without us hand-rolling
    // a JsObject with native accessors for each method.
    let _ = context.eval(boa_engine::Source::from_bytes(
        "var logger = { info: log_info, warn: log_warn, error: log_error, debug: log_debug };",
    ));
}

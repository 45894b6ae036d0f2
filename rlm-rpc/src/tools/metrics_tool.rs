//! ABOUTME: rlm_get_metrics: a point-in-time snapshot of the process-wide counters/gauges/histograms
//! ABOUTME: Also refreshes the gauges that only make sense computed on demand (active_sessions, cache sizes)

use serde::Deserialize;
use serde_json::{json, Value};

use crate::dispatcher::Dispatcher;
use crate::error::{parse_params, Result};

pub async fn get_metrics(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Params {}
    let _: Params = parse_params(params)?;

    let (session_count, sessions_created, sessions_evicted) = dispatcher.registry.metrics_snapshot();
    dispatcher.metrics.set_gauge("active_sessions", session_count as i64);
    dispatcher.metrics.set_gauge("cache_size", dispatcher.chunk_cache.len() as i64);
    dispatcher.metrics.set_gauge("index_size", dispatcher.index_cache.len() as i64);
    dispatcher.metrics.set_gauge("sessions_created_total", sessions_created as i64);
    dispatcher.metrics.set_gauge("sessions_evicted_total", sessions_evicted as i64);

    let snapshot = dispatcher.metrics.snapshot();
    Ok(json!({
        "success": true,
        "uptime": snapshot.uptime_secs,
        "counters": snapshot.counters,
        "gauges": snapshot.gauges,
        "histograms": snapshot.histograms,
    }))
}

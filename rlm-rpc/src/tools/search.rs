//! ABOUTME: Searcher tools: rlm_search_context (regex) and rlm_find_all (substring scan)
//! ABOUTME: Both consult/populate the shared query-result cache keyed by (session, context, kind, options, content-hash)

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use rlm_core::hash::content_fingerprint;
use rlm_search::cache::{query_key, QueryKind};
use rlm_search::regex_search::{self, RegexSearchOptions};
use rlm_search::substring_search::{self, SubstringSearchOptions};

use crate::dispatcher::Dispatcher;
use crate::error::{parse_params, Result};
use crate::metrics::{HistogramName, Timer};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct SearchContextParams {
    session_id: Option<String>,
    context_id: String,
    pattern: String,
    #[serde(default)]
    compact: bool,
    #[serde(default)]
    context_chars: Option<usize>,
    #[serde(default)]
    max_matches: Option<usize>,
}

pub async fn search_context(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: SearchContextParams = parse_params(params)?;
    let _timer = Timer::start(&dispatcher.metrics, HistogramName::SearchDuration);
    let ctx = dispatcher.registry.get_context(p.session_id.as_deref(), &p.context_id).await?;
    let sid = dispatcher.resolve_session_id(p.session_id.as_deref()).await?;

    let options_value = json!({
        "pattern": p.pattern,
        "compact": p.compact,
        "contextChars": p.context_chars,
        "maxMatches": p.max_matches,
    });
    let hash = content_fingerprint(&ctx.content);
    let key = query_key(&sid, &p.context_id, QueryKind::Search, &options_value, &hash);

    if let Some(cached) = dispatcher.search_cache.get(&key) {
        dispatcher.metrics.incr("cache_hits_query");
        return Ok(json!({"success": true, "matches": cached}));
    }
    dispatcher.metrics.incr("cache_misses_query");

    let options = RegexSearchOptions {
        max_matches: p.max_matches.unwrap_or(dispatcher.config.search.max_matches),
        budget: Duration::from_millis(dispatcher.config.search.regex_timeout_ms),
        context_chars: p.context_chars.unwrap_or(dispatcher.config.search.context_window_chars),
        compact: p.compact,
    };
    let matches = regex_search::search(&ctx.content, &p.pattern, &options)?;
    dispatcher.search_cache.put(key, matches.clone());
    dispatcher.metrics.incr("searches");

    Ok(json!({"success": true, "matches": matches}))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct FindAllParams {
    session_id: Option<String>,
    context_id: String,
    needle: String,
    #[serde(default = "default_case_sensitive")]
    case_sensitive: bool,
    #[serde(default)]
    max_matches: Option<usize>,
}

fn default_case_sensitive() -> bool {
    true
}

pub async fn find_all(dispatcher: &Dispatcher, params: Value) -> Result<Value> {
    let p: FindAllParams = parse_params(params)?;
    let _timer = Timer::start(&dispatcher.metrics, HistogramName::SearchDuration);
    let ctx = dispatcher.registry.get_context(p.session_id.as_deref(), &p.context_id).await?;
    let sid = dispatcher.resolve_session_id(p.session_id.as_deref()).await?;

    let options_value = json!({
        "needle": p.needle,
        "caseSensitive": p.case_sensitive,
        "maxMatches": p.max_matches,
    });
    let hash = content_fingerprint(&ctx.content);
    let key = query_key(&sid, &p.context_id, QueryKind::FindAll, &options_value, &hash);

    if let Some(cached) = dispatcher.find_all_cache.get(&key) {
        dispatcher.metrics.incr("cache_hits_query");
        return Ok(json!({"success": true, "matches": cached}));
    }
    dispatcher.metrics.incr("cache_misses_query");

    let options = SubstringSearchOptions {
        case_sensitive: p.case_sensitive,
        max_matches: p.max_matches.unwrap_or(dispatcher.config.search.max_matches),
    };
    let matches = substring_search::find_all(&ctx.content, &p.needle, &options);
    dispatcher.find_all_cache.put(key, matches.clone());
    dispatcher.metrics.incr("searches");

    Ok(json!({"success": true, "matches": matches}))
}

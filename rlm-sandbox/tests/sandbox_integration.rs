//! ABOUTME: Integration coverage for the expression engine's curated helper surface
//! ABOUTME: Each test drives execute() end to end rather than poking at a bare boa_engine::Context

use std::sync::Arc;

use rlm_core::config::{RlmConfig, SandboxConfig};
use rlm_sandbox::engine::execute;
use rlm_session::registry::SessionRegistry;

fn registry() -> Arc<SessionRegistry> {
    SessionRegistry::new(Arc::new(RlmConfig::default()))
}

fn run(registry: &Arc<SessionRegistry>, session_id: &str, code: &str) -> rlm_sandbox::engine::ExecutionOutcome {
    let handle = tokio::runtime::Handle::current();
    execute(code, Arc::clone(registry), session_id.to_string(), handle, &SandboxConfig::default())
}

#[tokio::test]
async fn state_helpers_round_trip_through_the_session_registry() {
    let reg = registry();
    reg.create_session().await.ok();
    let outcome = run(
        &reg,
        "default",
        "setVar('count', 41); setVar('count', getVar('count') + 1); print(getVar('count'));",
    );
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "42\n");

    let stored = reg.get_variable(Some("default"), "count").await.unwrap();
    assert_eq!(stored, Some(serde_json::json!(42.0)));
}

#[tokio::test]
async fn set_var_silently_ignores_reserved_names() {
    let reg = registry();
    let outcome = run(&reg, "default", "setVar('__proto__', 'x'); print(listVars().__proto__ === undefined);");
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "true\n");
}

#[tokio::test]
async fn answer_helpers_set_append_and_read_back() {
    let reg = registry();
    let outcome = run(
        &reg,
        "default",
        "setAnswer('hello', false); appendAnswer(' world'); var a = getAnswer(); print(a.content + '|' + a.ready);",
    );
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "hello world|false\n");
}

#[tokio::test]
async fn context_access_is_read_only_and_missing_ids_return_null() {
    let reg = registry();
    reg.load(Some("default"), "doc", "hello world".to_string()).await.unwrap();
    let outcome = run(
        &reg,
        "default",
        "print(getContext('doc').content); print(getContextMetadata('doc').wordCount); print(getContext('nope'));",
    );
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "hello world\n2\nnull\n");
}

#[tokio::test]
async fn sessions_are_isolated_from_one_another() {
    let reg = registry();
    let other = reg.create_session().await.unwrap();
    run(&reg, other.as_str(), "setVar('secret', 'only-mine');");

    let outcome = run(&reg, "default", "print(getVar('secret'));");
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "null\n");
}

#[tokio::test]
async fn json_helpers_absorb_errors_instead_of_throwing() {
    let reg = registry();
    let outcome = run(
        &reg,
        "default",
        "print(jsonStringify({a: 1, b: [2, 3]})); print(jsonParse('not json')); print(jsonParse('[1,2,3]').length);",
    );
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "{\"a\":1,\"b\":[2,3]}\nnull\n3\n");
}

#[tokio::test]
async fn regex_helpers_never_throw_on_redos_shaped_patterns() {
    let reg = registry();
    let outcome = run(
        &reg,
        "default",
        "print(regexTest('aaaaaaaaaaaaaaaaaaaaaaaa!', '(a+)+b')); print(regexSearch('x', '(a+)+b')); print(regexReplace('x', '(a+)+b', 'y'));",
    );
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "false\nnull\nx\n");
}

#[tokio::test]
async fn regex_find_all_reports_every_match_with_offsets() {
    let reg = registry();
    let outcome = run(&reg, "default", "var hits = regexFindAll('cat sat cat', 'cat'); print(hits.length); print(hits[1].offset);");
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "2\n8\n");
}

#[tokio::test]
async fn collection_helpers_cover_range_chunk_take_skip_unique_group_by() {
    let reg = registry();
    let code = r#"
        print(range(5).join(','));
        print(chunk([1,2,3,4,5], 2).length);
        print(take([1,2,3,4], 2).join(','));
        print(skip([1,2,3,4], 2).join(','));
        print(unique([1,1,2,2,3]).join(','));
        var g = groupBy([1,2,3,4], function(n) { return n % 2 === 0 ? 'even' : 'odd'; });
        print(g.even.join(',') + '/' + g.odd.join(','));
    "#;
    let outcome = run(&reg, "default", code);
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "0,1,2,3,4\n3\n1,2\n3,4\n1,2,3\n2,4/1,3\n");
}

#[tokio::test]
async fn range_helper_is_capped_even_when_asked_for_more() {
    let reg = registry();
    let mut config = SandboxConfig::default();
    config.range_size_cap = 3;
    let handle = tokio::runtime::Handle::current();
    let outcome = execute("print(range(1000).length);", reg, "default".to_string(), handle, &config);
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "3\n");
}

#[tokio::test]
async fn math_helpers_sum_and_avg_skip_non_numeric_entries() {
    let reg = registry();
    let outcome = run(&reg, "default", "print(sum([1,2,3])); print(avg([2,4,6])); print(avg([]));");
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.output, "6\n4\n0\n");
}

#[tokio::test]
async fn output_is_truncated_at_the_configured_cap() {
    let reg = registry();
    let mut config = SandboxConfig::default();
    config.output_cap_chars = 20;
    let handle = tokio::runtime::Handle::current();
    let outcome = execute(
        "print('0123456789'); print('0123456789'); print('more');",
        reg,
        "default".to_string(),
        handle,
        &config,
    );
    assert_eq!(outcome.error, None);
    assert!(outcome.output.len() > config.output_cap_chars);
    assert!(outcome.output.ends_with("[output truncated]"));
}

#[tokio::test]
async fn no_filesystem_network_or_process_globals_are_reachable() {
    let reg = registry();
    for snippet in ["typeof require", "typeof process", "typeof fetch", "typeof eval", "typeof Deno"] {
        let outcome = run(&reg, "default", &format!("print({snippet});"));
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.output.trim(), "undefined", "expected {snippet} to be absent");
    }
}

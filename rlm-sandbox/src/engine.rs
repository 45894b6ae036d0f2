//! ABOUTME: Builds a fresh boa_engine Context per execution and runs it on a dedicated thread under a wall-clock budget
//! ABOUTME: boa has no native preemption hook, so a timed-out script's thread is abandoned rather than joined

use std::rc::Rc;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use boa_engine::{Context, Source};
use rlm_core::config::SandboxConfig;
use rlm_session::registry::SessionRegistry;

use crate::helpers;
use crate::host::SandboxHost;
use crate::output::OutputBuffer;

const TIMEOUT_MARKER: &str = "execution exceeded the sandbox time budget";

pub struct ExecutionOutcome {
    pub output: String,
    pub error: Option<String>,
    pub duration_ms: u64,
}

fn run_on_dedicated_thread(code: String, registry: Arc<SessionRegistry>, session_id: String, runtime: tokio::runtime::Handle, config: SandboxConfig) -> (String, Option<String>) {
    let output = OutputBuffer::new(config.output_cap_chars);
    let host = Rc::new(SandboxHost {
        registry,
        session_id,
        runtime,
        output: output.clone(),
        find_all_cap: config.find_all_match_cap,
        range_size_cap: config.range_size_cap,
    });

    let mut context = Context::default();
    helpers::install(&mut context, &host);
    // boa ships a standard `eval`/`Function` like any JS engine; neither
    // belongs in a sandbox whose isolation contract forbids dynamic code
    // loading, so both are shadowed with inert globals before user code runs.
    let _ = context.eval(Source::from_bytes(b"var eval = undefined; var Function = undefined;"));

    let eval_result = context.eval(Source::from_bytes(code.as_bytes()));
    let error = eval_result.err().map(|e| e.to_string());
    (output.take(), error)
}

/// Evaluates `code` against the curated environment, returning within
/// `config.execution_timeout_ms` regardless of whether the script itself
/// finishes. A timed-out script keeps running on its own thread, detached
/// from this call, until it terminates on its own or the process exits;
/// its output never reaches the caller since the OutputBuffer it owns is
/// local to the abandoned thread.
#[must_use]
pub fn execute(code: &str, registry: Arc<SessionRegistry>, session_id: String, runtime: tokio::runtime::Handle, config: &SandboxConfig) -> ExecutionOutcome {
    let (tx, rx) = mpsc::channel();
    let code = code.to_string();
    let thread_config = config.clone();
    let budget = Duration::from_millis(config.execution_timeout_ms);
    let start = Instant::now();

    std::thread::spawn(move || {
        let outcome = run_on_dedicated_thread(code, registry, session_id, runtime, thread_config);
        let _ = tx.send(outcome);
    });

    match rx.recv_timeout(budget) {
        Ok((output, error)) => ExecutionOutcome {
            output,
            error,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        Err(_) => ExecutionOutcome {
            output: String::new(),
            error: Some(TIMEOUT_MARKER.to_string()),
            duration_ms: start.elapsed().as_millis() as u64,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlm_core::config::RlmConfig;

    fn test_registry() -> Arc<SessionRegistry> {
        SessionRegistry::new(Arc::new(RlmConfig::default()))
    }

    #[tokio::test]
    async fn e6_infinite_loop_times_out_with_marker_and_empty_output() {
        let registry = test_registry();
        let mut config = SandboxConfig::default();
        config.execution_timeout_ms = 50;
        let handle = tokio::runtime::Handle::current();

        let outcome = execute(
            "print('before'); while (true) {}",
            registry,
            "default".to_string(),
            handle,
            &config,
        );

        assert_eq!(outcome.output, "");
        assert!(outcome.error.unwrap().contains(TIMEOUT_MARKER));
        assert!(outcome.duration_ms >= config.execution_timeout_ms);
    }

    #[tokio::test]
    async fn simple_expression_completes_within_budget() {
        let registry = test_registry();
        let config = SandboxConfig::default();
        let handle = tokio::runtime::Handle::current();

        let outcome = execute(
            "print('hi ' + (1 + 2))",
            registry,
            "default".to_string(),
            handle,
            &config,
        );

        assert_eq!(outcome.error, None);
        assert_eq!(outcome.output, "hi 3\n");
    }
}

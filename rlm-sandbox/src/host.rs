//! ABOUTME: Per-execution host state: the bits every native helper closure needs captured
//! ABOUTME: Confined to the dedicated script thread; never crosses an .await, so Rc/RefCell is fine here

use std::sync::Arc;

use rlm_session::registry::SessionRegistry;

use crate::output::OutputBuffer;

pub struct SandboxHost {
    pub registry: Arc<SessionRegistry>,
    pub session_id: String,
    pub runtime: tokio::runtime::Handle,
    pub output: OutputBuffer,
    pub find_all_cap: usize,
    pub range_size_cap: usize,
}

impl SandboxHost {
    /// Runs an async Session Registry call to completion from inside the
    /// sandbox's dedicated thread. Safe because this thread is never a tokio
    /// worker thread, so blocking here cannot starve the reactor.
    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}

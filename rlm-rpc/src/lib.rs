//! ABOUTME: RPC tool layer (thin): parameter validation, dispatch, result framing and the metrics snapshot
//! ABOUTME: `Transport` is the seam a binary plugs a wire framing into; this crate ships none itself

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod tools;

use serde_json::Value;

pub use dispatcher::Dispatcher;

/// A framing for the tool catalog this crate dispatches over.
///
/// `rlm-rpc` only validates and routes `(tool, params) -> result` calls; it
/// has no opinion on how those calls cross a process boundary. A binary
/// (e.g. `rlm-cli`) implements `Transport` once per wire format it wants to
/// speak and drives the event loop itself.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn serve(&self, dispatcher: std::sync::Arc<Dispatcher>) -> anyhow::Result<()>;
}

/// A single request as any `Transport` implementation decodes it off the wire.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default = "default_params")]
    pub params: Value,
}

fn default_params() -> Value {
    Value::Object(serde_json::Map::new())
}

pub mod prelude {
    pub use crate::dispatcher::Dispatcher;
    pub use crate::error::{envelope_for, parse_params, Result, RpcError};
    pub use crate::metrics::{HistogramName, Metrics, MetricsSnapshot, Timer};
    pub use crate::{ToolCall, Transport};
}

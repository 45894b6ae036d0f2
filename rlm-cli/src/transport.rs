//! ABOUTME: Line-delimited JSON-over-stdio `Transport`: one request per input line, one response per output line
//! ABOUTME: Malformed lines get an INVALID_INPUT-shaped response rather than killing the loop

use std::sync::Arc;

use rlm_rpc::{Dispatcher, Transport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

/// A single line of input: an optional client-assigned `id` echoed back on
/// the response line so a caller can match replies out of order, a `tool`
/// name, and its `params`.
#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    tool: String,
    #[serde(default = "default_params")]
    params: Value,
}

fn default_params() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Debug, Serialize)]
struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(flatten)]
    result: Value,
}

/// Reads requests from stdin one line at a time and writes one JSON response
/// line per request to stdout. Runs until stdin is closed (EOF).
pub struct StdioTransport;

#[async_trait::async_trait]
impl Transport for StdioTransport {
    async fn serve(&self, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Request>(trimmed) {
                Ok(request) => {
                    debug!(tool = %request.tool, "dispatching tool call");
                    let result = dispatcher.dispatch(&request.tool, request.params).await;
                    Response { id: request.id, result }
                }
                Err(err) => {
                    warn!(error = %err, "received malformed request line");
                    Response {
                        id: None,
                        result: serde_json::json!({
                            "error": true,
                            "code": rlm_core::envelope::ErrorCode::ValidationInvalidInput as u32,
                            "message": format!("malformed request: {err}"),
                        }),
                    }
                }
            };

            let mut encoded = serde_json::to_string(&response)?;
            encoded.push('\n');
            stdout.write_all(encoded.as_bytes()).await?;
            stdout.flush().await?;
        }

        Ok(())
    }
}

/// Runs a single request to completion and returns its encoded response,
/// for the `once` subcommand — no loop, no stdout framing beyond the one line.
pub async fn run_once(dispatcher: Arc<Dispatcher>, request_json: &str) -> anyhow::Result<String> {
    let request: Request = serde_json::from_str(request_json.trim())?;
    let result = dispatcher.dispatch(&request.tool, request.params).await;
    let response = Response { id: request.id, result };
    Ok(serde_json::to_string_pretty(&response)?)
}

//! ABOUTME: The RPC-layer error type: wraps every component error and adds the tool layer's own validation kind
//! ABOUTME: `into_envelope` is the single place a typed error becomes the wire `ErrorEnvelope`

use rlm_core::envelope::{ErrorCode, ErrorEnvelope, IntoEnvelope};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RpcError>;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error(transparent)]
    Session(#[from] rlm_session::error::SessionError),

    #[error(transparent)]
    Decompose(#[from] rlm_decompose::error::DecomposeError),

    #[error(transparent)]
    Rank(#[from] rlm_rank::error::RankError),

    #[error(transparent)]
    Search(#[from] rlm_search::error::SearchError),

    #[error(transparent)]
    Sandbox(#[from] rlm_sandbox::error::SandboxError),
}

impl RpcError {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }
}

impl IntoEnvelope for RpcError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownTool { .. } => ErrorCode::SystemNotImplemented,
            Self::InvalidInput { .. } => ErrorCode::ValidationInvalidInput,
            Self::MissingField { .. } => ErrorCode::ValidationMissingField,
            Self::Session(e) => e.error_code(),
            Self::Decompose(e) => e.error_code(),
            Self::Rank(e) => e.error_code(),
            Self::Search(e) => e.error_code(),
            Self::Sandbox(e) => e.error_code(),
        }
    }
}

/// Converts a param-parsing failure from `serde_json` into `MISSING_FIELD`/`INVALID_INPUT`,
/// matching the tool layer's strict-schema rule: unknown fields and
/// missing required fields are both rejected before a tool's handler runs.
pub fn parse_params<T: for<'de> serde::Deserialize<'de>>(params: serde_json::Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| {
        let msg = e.to_string();
        if msg.contains("missing field") {
            RpcError::MissingField { field: msg }
        } else {
            RpcError::InvalidInput { message: msg }
        }
    })
}

/// Builds the wire envelope for a failed tool call, attaching a fresh trace id
/// so the caller (and operator logs) can correlate the failure across retries.
#[must_use]
pub fn envelope_for(err: RpcError) -> ErrorEnvelope {
    err.into_envelope().with_trace_id(uuid::Uuid::new_v4().to_string())
}

//! ABOUTME: Error type for session lifecycle, context store and variable operations
//! ABOUTME: Each variant maps onto a stable rlm-core ErrorCode at the RPC boundary

use rlm_core::envelope::{ErrorCode, IntoEnvelope};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {id}")]
    SessionNotFound { id: String },

    #[error("session expired: {id}")]
    SessionExpired { id: String },

    #[error("maximum session count reached ({max})")]
    MaxSessionsReached { max: usize },

    #[error("session memory would exceed cap ({cap} bytes)")]
    SessionMemoryExceeded { cap: usize },

    #[error("context not found: {id}")]
    ContextNotFound { id: String },

    #[error("context already exists: {id}")]
    ContextAlreadyExists { id: String },

    #[error("context {id} exceeds size cap of {cap} bytes")]
    ContextTooLarge { id: String, cap: usize },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("variable/context limit exceeded: {message}")]
    VariableLimitExceeded { message: String },
}

impl IntoEnvelope for SessionError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::SessionNotFound { .. } => ErrorCode::SessionNotFound,
            Self::SessionExpired { .. } => ErrorCode::SessionExpired,
            Self::MaxSessionsReached { .. } => ErrorCode::SessionMaxReached,
            Self::SessionMemoryExceeded { .. } => ErrorCode::SessionMemoryExceeded,
            Self::ContextNotFound { .. } => ErrorCode::ContextNotFound,
            Self::ContextAlreadyExists { .. } => ErrorCode::ContextAlreadyExists,
            Self::ContextTooLarge { .. } => ErrorCode::ContextTooLarge,
            Self::InvalidInput { .. } => ErrorCode::ValidationInvalidInput,
            Self::VariableLimitExceeded { .. } => ErrorCode::ResourceVariableLimit,
        }
    }
}

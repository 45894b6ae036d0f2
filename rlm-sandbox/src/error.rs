//! ABOUTME: Error type for the sandbox host itself (setup failures), distinct from in-script failures
//! ABOUTME: A failing script never bubbles up as one of these; it becomes an ExecutionRecord with `error` set

use rlm_core::envelope::{ErrorCode, IntoEnvelope};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SandboxError>;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("failed to start the script host: {message}")]
    HostSetupFailed { message: String },
}

impl IntoEnvelope for SandboxError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput { .. } => ErrorCode::ValidationInvalidInput,
            Self::HostSetupFailed { .. } => ErrorCode::SystemInternal,
        }
    }
}

//! ABOUTME: Error type for chunking strategy validation and execution failures
//! ABOUTME: Maps onto the Validation/Resource error codes at the RPC boundary

use rlm_core::envelope::{ErrorCode, IntoEnvelope};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecomposeError>;

#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("chunk limit exceeded: produced more than {max} chunks")]
    ChunkLimitExceeded { max: usize },

    #[error("invalid regex pattern: {message}")]
    InvalidRegex { message: String },

    #[error("tokenizer unavailable: {message}")]
    TokenizerUnavailable { message: String },
}

impl IntoEnvelope for DecomposeError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput { .. } | Self::TokenizerUnavailable { .. } => ErrorCode::ValidationInvalidInput,
            Self::ChunkLimitExceeded { .. } => ErrorCode::ResourceChunkLimit,
            Self::InvalidRegex { .. } => ErrorCode::SearchInvalidRegex,
        }
    }
}

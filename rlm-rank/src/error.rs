//! ABOUTME: Error type for index build and ranking failures
//! ABOUTME: Most failures here are internal/validation; ranking itself never "fails" on a well-formed query

use rlm_core::envelope::{ErrorCode, IntoEnvelope};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RankError>;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("no decomposition available to index")]
    NoDecomposition,
}

impl IntoEnvelope for RankError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput { .. } | Self::NoDecomposition => ErrorCode::ValidationInvalidInput,
        }
    }
}

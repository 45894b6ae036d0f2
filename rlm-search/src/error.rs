//! ABOUTME: Error type for the Searcher: regex validation/compile failures and the wall-clock budget
//! ABOUTME: Maps to the same numeric codes the shared error envelope assigns to search operations

use rlm_core::envelope::{ErrorCode, IntoEnvelope};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid regex: {message}")]
    InvalidRegex { message: String },

    #[error("regex search exceeded its time budget")]
    RegexTimeout,

    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl IntoEnvelope for SearchError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidRegex { .. } => ErrorCode::SearchInvalidRegex,
            Self::RegexTimeout => ErrorCode::SearchRegexTimeout,
            Self::InvalidInput { .. } => ErrorCode::ValidationInvalidInput,
        }
    }
}

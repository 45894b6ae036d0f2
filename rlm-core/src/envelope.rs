//! ABOUTME: The stable error envelope and numeric codes every RPC failure is serialized into
//! ABOUTME: Codes are preserved across transports; component crates map their own errors onto them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;

/// Stable numeric error codes, grouped by the subsystem they come from.
/// Values are part of the wire contract: never renumber an existing variant.
/// Serialized as the bare integer (`serde_repr`), per spec.md's `code: int`
/// wire shape — never as the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u32)]
pub enum ErrorCode {
    // Context: 1000s
    ContextNotFound = 1000,
    ContextTooLarge = 1001,
    ContextInvalidId = 1002,
    ContextAlreadyExists = 1003,

    // Session: 1100s
    SessionNotFound = 1100,
    SessionExpired = 1101,
    SessionMaxReached = 1102,
    SessionMemoryExceeded = 1103,

    // Execution: 1200s
    ExecutionTimeout = 1200,
    ExecutionFailed = 1201,
    ExecutionInvalidCode = 1202,
    ExecutionSandboxError = 1203,

    // Search: 1300s
    SearchInvalidRegex = 1300,
    SearchRegexTimeout = 1301,
    SearchRedosDetected = 1302,

    // Resource: 1400s
    ResourceMemoryLimit = 1400,
    ResourceVariableLimit = 1401,
    ResourceChunkLimit = 1402,
    ResourceOutputLimit = 1403,

    // Validation: 1500s
    ValidationInvalidInput = 1500,
    ValidationMissingField = 1501,
    ValidationOutOfRange = 1502,

    // System: 1600s
    SystemInternal = 1600,
    SystemNotImplemented = 1601,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The envelope every failed RPC call returns in place of a result payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: bool,
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: true,
            code,
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
            trace_id: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_serializes_as_its_numeric_value() {
        let json = serde_json::to_value(ErrorCode::SystemNotImplemented).unwrap();
        assert_eq!(json, serde_json::json!(1601));
    }

    #[test]
    fn envelope_serializes_with_camel_case_trace_id_and_numeric_code() {
        let envelope = ErrorEnvelope::new(ErrorCode::ValidationInvalidInput, "bad input").with_trace_id("trace-1");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["code"], 1500);
        assert_eq!(json["traceId"], "trace-1");
        assert!(json.get("trace_id").is_none());
    }
}

/// Implemented by every component error enum so the RPC layer can map it
/// onto the wire envelope without a match arm per crate per call site.
pub trait IntoEnvelope {
    fn error_code(&self) -> ErrorCode;
    fn into_envelope(self) -> ErrorEnvelope
    where
        Self: fmt::Display + Sized,
    {
        let code = self.error_code();
        ErrorEnvelope::new(code, self.to_string())
    }
}

//! ABOUTME: Session-local types that don't belong in rlm-core: execution history and append mode
//! ABOUTME: ExecutionRecord is written by rlm-sandbox but owned and bounded by the session it ran in

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append vs prepend, for `append_context`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppendMode {
    Append,
    Prepend,
}

/// One entry in a session's bounded, FIFO execution history (sandbox runs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: String,
    pub code_preview: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub executed_at: DateTime<Utc>,
}

/// Lightweight summary returned by `stats()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub id: String,
    pub context_count: usize,
    pub variable_count: usize,
    pub history_count: usize,
    pub estimated_memory_bytes: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

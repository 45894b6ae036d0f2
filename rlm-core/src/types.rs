//! ABOUTME: The data model shared across the session, decompose, rank and search crates
//! ABOUTME: Context, Chunk, DecompositionRecord, IndexEntry-adjacent types and AnswerState

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form JSON value used for sandbox state, chunk metadata and option bags.
pub type Value = serde_json::Value;

/// Structural classification of a context's text, derived once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    PlainText,
    Json,
    Csv,
    Code,
    Markdown,
    Xml,
    Log,
    Mixed,
}

impl Default for Structure {
    fn default() -> Self {
        Self::PlainText
    }
}

/// Metadata derived from a context's content at load/append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMetadata {
    pub length: usize,
    pub line_count: usize,
    pub word_count: usize,
    pub structure: Structure,
}

/// A named, session-owned text entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub id: String,
    pub content: String,
    pub metadata: ContextMetadata,
    pub created_at: DateTime<Utc>,
}

/// An immutable record of a prior decomposition, letting later calls
/// reproduce a split without re-transmitting chunking options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecompositionRecord {
    pub id: String,
    pub context_id: String,
    pub strategy: String,
    pub options: Value,
    pub created_at: DateTime<Utc>,
}

/// One slice of a context produced by a decomposition strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// The reserved `answer` variable: an incrementally constructed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerState {
    pub content: String,
    pub ready: bool,
}

impl Default for AnswerState {
    fn default() -> Self {
        Self {
            content: String::new(),
            ready: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_serializes_with_camel_case_offsets() {
        let chunk = Chunk {
            index: 0,
            start_offset: 0,
            end_offset: 4,
            content: "abcd".to_string(),
            metadata: None,
        };
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["startOffset"], 0);
        assert_eq!(value["endOffset"], 4);
        assert!(value.get("start_offset").is_none());
    }

    #[test]
    fn context_metadata_serializes_with_camel_case_field_names() {
        let metadata = ContextMetadata {
            length: 11,
            line_count: 1,
            word_count: 2,
            structure: Structure::PlainText,
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["lineCount"], 1);
        assert_eq!(value["wordCount"], 2);
        assert_eq!(value["structure"], "plain_text");
    }
}

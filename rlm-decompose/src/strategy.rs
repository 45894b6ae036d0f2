//! ABOUTME: The tagged-variant strategy catalog and per-tag option records
//! ABOUTME: `decompose()` is the single entry point; strategies share only the emit pipeline and MAX_CHUNKS guard

use serde::{Deserialize, Serialize};

use crate::error::{DecomposeError, Result};
use rlm_core::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    FixedSize,
    ByLines,
    ByParagraphs,
    BySections,
    ByRegex,
    BySentences,
    ByTokens,
}

impl StrategyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FixedSize => "fixed_size",
            Self::ByLines => "by_lines",
            Self::ByParagraphs => "by_paragraphs",
            Self::BySections => "by_sections",
            Self::ByRegex => "by_regex",
            Self::BySentences => "by_sentences",
            Self::ByTokens => "by_tokens",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "fixed_size" => Ok(Self::FixedSize),
            "by_lines" => Ok(Self::ByLines),
            "by_paragraphs" => Ok(Self::ByParagraphs),
            "by_sections" => Ok(Self::BySections),
            "by_regex" => Ok(Self::ByRegex),
            "by_sentences" => Ok(Self::BySentences),
            "by_tokens" => Ok(Self::ByTokens),
            other => Err(DecomposeError::InvalidInput {
                message: format!("unknown strategy: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedSizeOptions {
    pub chunk_size: usize,
    #[serde(default)]
    pub overlap: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByLinesOptions {
    pub lines_per_chunk: usize,
    #[serde(default)]
    pub overlap: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BySectionsOptions {
    #[serde(default)]
    pub merge_empty_sections: bool,
    #[serde(default)]
    pub min_section_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByRegexOptions {
    pub pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByTokensOptions {
    pub tokens_per_chunk: usize,
    #[serde(default)]
    pub token_overlap: usize,
}

/// Parses a JSON option bag into a typed record, translating serde's
/// (somewhat opaque) errors into the crate's `INVALID_INPUT` error.
pub fn parse_options<T: for<'de> Deserialize<'de>>(options: &Value) -> Result<T> {
    serde_json::from_value(options.clone()).map_err(|e| DecomposeError::InvalidInput {
        message: format!("invalid options: {e}"),
    })
}

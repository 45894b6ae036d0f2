//! ABOUTME: Decomposer: seven chunking strategies behind one entry point, sharing the MAX_CHUNKS guard
//! ABOUTME: Chunk caching lives alongside it, keyed by (session, context, strategy, options) + content-hash

pub mod cache;
pub mod error;
pub mod offsets;
pub mod strategies;
pub mod strategy;
pub mod suggest;
pub mod tokenizer;

use rlm_core::types::{Chunk, Value};

use crate::error::{DecomposeError, Result};
use crate::strategy::{parse_options, ByLinesOptions, ByRegexOptions, BySectionsOptions, ByTokensOptions, FixedSizeOptions, StrategyKind};
use crate::tokenizer::resolve_tokenizer;

/// Hard ceiling on chunks produced by a single decomposition:
/// `CHUNK_LIMIT_EXCEEDED` past this point.
pub const MAX_CHUNKS: usize = 10_000;

/// Dispatches to the named strategy, then enforces the shared invariants:
/// `CHUNK_LIMIT_EXCEEDED` past `max_chunks`, and that every chunk satisfies
/// `end_offset >= start_offset`.
pub fn decompose(text: &str, strategy: StrategyKind, options: &Value, max_chunks: usize) -> Result<Vec<Chunk>> {
    let chunks = match strategy {
        StrategyKind::FixedSize => {
            let opts: FixedSizeOptions = parse_options(options)?;
            strategies::fixed_size::decompose(text, &opts)?
        }
        StrategyKind::ByLines => {
            let opts: ByLinesOptions = parse_options(options)?;
            strategies::by_lines::decompose(text, &opts)?
        }
        StrategyKind::ByParagraphs => strategies::by_paragraphs::decompose(text)?,
        StrategyKind::BySections => {
            let opts: BySectionsOptions = parse_options(options)?;
            strategies::by_sections::decompose(text, &opts)?
        }
        StrategyKind::ByRegex => {
            let opts: ByRegexOptions = parse_options(options)?;
            strategies::by_regex::decompose(text, &opts)?
        }
        StrategyKind::BySentences => strategies::by_sentences::decompose(text)?,
        StrategyKind::ByTokens => {
            let opts: ByTokensOptions = parse_options(options)?;
            let tokenizer = resolve_tokenizer(options);
            strategies::by_tokens::decompose(text, &opts, tokenizer.as_ref())?
        }
    };

    if chunks.len() > max_chunks {
        return Err(DecomposeError::ChunkLimitExceeded { max: max_chunks });
    }
    for chunk in &chunks {
        debug_assert!(chunk.end_offset >= chunk.start_offset);
        if chunk.end_offset < chunk.start_offset {
            return Err(DecomposeError::InvalidInput {
                message: format!("chunk {} has end_offset < start_offset", chunk.index),
            });
        }
    }
    Ok(chunks)
}

pub mod prelude {
    pub use crate::cache::{cache_key, ChunkCache};
    pub use crate::error::{DecomposeError, Result};
    pub use crate::strategy::StrategyKind;
    pub use crate::suggest::{suggest_strategy, Suggestion};
    pub use crate::tokenizer::{resolve_tokenizer, DefaultTokenizer, Token, TokenizerProvider};
    pub use crate::{decompose, MAX_CHUNKS};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatches_by_strategy_name() {
        let chunks = decompose(
            "abcdefghij",
            StrategyKind::FixedSize,
            &json!({"chunkSize": 4, "overlap": 1}),
            MAX_CHUNKS,
        )
        .unwrap();
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn enforces_chunk_limit() {
        let text = "a ".repeat(100);
        let err = decompose(&text, StrategyKind::FixedSize, &json!({"chunkSize": 1, "overlap": 0}), 5).unwrap_err();
        assert!(matches!(err, DecomposeError::ChunkLimitExceeded { max: 5 }));
    }

    #[test]
    fn indices_are_generation_order() {
        let chunks = decompose(
            "abcdefghij",
            StrategyKind::FixedSize,
            &json!({"chunkSize": 3, "overlap": 0}),
            MAX_CHUNKS,
        )
        .unwrap();
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
    }
}

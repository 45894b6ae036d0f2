//! ABOUTME: by_tokens strategy: windows over tokenizer-provider output, offsets reconstructed by decoding prefixes
//! ABOUTME: Works against any TokenizerProvider, not just the in-process default

use serde_json::json;

use rlm_core::types::Chunk;

use crate::error::{DecomposeError, Result};
use crate::strategy::ByTokensOptions;
use crate::tokenizer::TokenizerProvider;

pub fn decompose(text: &str, opts: &ByTokensOptions, tokenizer: &dyn TokenizerProvider) -> Result<Vec<Chunk>> {
    if opts.tokens_per_chunk == 0 {
        return Err(DecomposeError::InvalidInput {
            message: "tokensPerChunk must be >= 1".to_string(),
        });
    }
    let step = opts.tokens_per_chunk as isize - opts.token_overlap as isize;
    if step <= 0 {
        return Err(DecomposeError::InvalidInput {
            message: "by_tokens: tokenOverlap must be smaller than tokensPerChunk (step <= 0)".to_string(),
        });
    }
    let step = step as usize;

    let tokens = tokenizer.encode(text);
    let total = tokens.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut chunks = Vec::new();
    let mut index = 0usize;
    let mut start = 0usize;
    while start < total {
        let end = (start + opts.tokens_per_chunk).min(total);
        // Decoding prefixes is the only offset-reconstruction technique
        // that works for an arbitrary tokenizer provider (no provider is
        // required to expose a cheap cumulative-length index).
        let start_offset = tokenizer.decode(&tokens[..start]).len();
        let end_offset = tokenizer.decode(&tokens[..end]).len();
        let content = tokenizer.decode(&tokens[start..end]);
        chunks.push(Chunk {
            index,
            start_offset,
            end_offset,
            content,
            metadata: Some(json!({
                "tokenStart": start,
                "tokenEnd": end,
                "tokenCount": end - start,
            })),
        });
        index += 1;
        start += step;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::DefaultTokenizer;

    #[test]
    fn windows_over_tokens_with_overlap() {
        let opts = ByTokensOptions {
            tokens_per_chunk: 2,
            token_overlap: 0,
        };
        let chunks = decompose("foo bar baz qux", &opts, &DefaultTokenizer).unwrap();
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert_eq!(&"foo bar baz qux"[c.start_offset..c.end_offset], c.content);
        }
    }

    #[test]
    fn rejects_non_positive_step() {
        let opts = ByTokensOptions {
            tokens_per_chunk: 2,
            token_overlap: 2,
        };
        assert!(decompose("a b c", &opts, &DefaultTokenizer).is_err());
    }
}

//! ABOUTME: Ranker/Index: BM25 scoring over a decomposition's chunks, with a two-tier cache
//! ABOUTME: The IndexEntry cache avoids re-tokenizing unchanged chunks; the query cache avoids re-scoring repeat queries

pub mod bm25;
pub mod cache;
pub mod error;
pub mod index;
pub mod tokenizer;

use std::sync::Arc;

use rlm_core::types::{Chunk, Value};

use crate::bm25::RankedChunk;
use crate::cache::{index_key, query_key, IndexCache, QueryCache};
use crate::error::Result;
use crate::index::IndexEntry;
use crate::tokenizer::TokenizerMode;

/// Parameters controlling a single ranking call, distinct from the
/// cache/index identity parameters (session, context, strategy, options).
#[derive(Debug, Clone)]
pub struct RankRequest<'a> {
    pub query: &'a str,
    pub top_k: usize,
    pub min_score: f64,
    pub tokenizer_mode: TokenizerMode,
}

/// Builds (or reuses) the BM25 index for the given chunk set and content
/// hash, then scores `request.query` against it, consulting and populating
/// both cache tiers along the way.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn rank_chunks(
    index_cache: &IndexCache,
    query_cache: &QueryCache,
    session_id: &str,
    context_id: &str,
    strategy: &str,
    decompose_options: &Value,
    content_hash: &str,
    chunks_if_missing: impl FnOnce() -> Vec<Chunk>,
    request: &RankRequest<'_>,
    k1: f64,
    b: f64,
) -> Vec<RankedChunk> {
    let ikey = index_key(session_id, context_id, strategy, decompose_options);
    let tokenizer_label = format!("{:?}", request.tokenizer_mode);
    let qkey = query_key(&ikey, request.query, request.top_k, request.min_score, &tokenizer_label);

    if let Some(cached) = query_cache.get(&qkey) {
        return cached;
    }

    let index: Arc<IndexEntry> = match index_cache.get(&ikey, content_hash) {
        Some(existing) => existing,
        None => {
            let chunks = chunks_if_missing();
            index_cache.put(ikey, content_hash.to_string(), IndexEntry::build(content_hash.to_string(), chunks, request.tokenizer_mode))
        }
    };

    let results = bm25::rank(&index, request.query, request.top_k, request.min_score, k1, b);
    query_cache.put(qkey, results.clone());
    results
}

/// Validates a raw `query` string: empty queries are rejected up front so
/// callers never pay for a tokenize-and-score pass that can only come back
/// empty.
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(error::RankError::InvalidInput {
            message: "query must not be empty".to_string(),
        });
    }
    Ok(())
}

pub mod prelude {
    pub use crate::bm25::{rank, RankedChunk};
    pub use crate::cache::{index_key, query_key, IndexCache, QueryCache};
    pub use crate::error::{RankError, Result};
    pub use crate::index::IndexEntry;
    pub use crate::tokenizer::{tokenize, TokenizerMode};
    pub use crate::{rank_chunks, validate_query, RankRequest};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk(content: &str, index: usize) -> Chunk {
        Chunk {
            index,
            start_offset: 0,
            end_offset: content.len(),
            content: content.to_string(),
            metadata: None,
        }
    }

    #[test]
    fn rank_chunks_builds_index_once_and_reuses_cache() {
        let index_cache = IndexCache::new(10);
        let query_cache = QueryCache::new(10);
        let chunks = vec![chunk("the cat sat", 0), chunk("dogs bark", 1), chunk("the cat and the cat", 2)];
        let request = RankRequest {
            query: "cat",
            top_k: 10,
            min_score: 0.0,
            tokenizer_mode: TokenizerMode::Word,
        };

        let first = rank_chunks(
            &index_cache,
            &query_cache,
            "s",
            "c",
            "fixed_size",
            &json!({}),
            "hash1",
            || chunks.clone(),
            &request,
            1.5,
            0.75,
        );
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].chunk_index, 2);

        let second = rank_chunks(
            &index_cache,
            &query_cache,
            "s",
            "c",
            "fixed_size",
            &json!({}),
            "hash1",
            || panic!("should not rebuild from cache"),
            &request,
            1.5,
            0.75,
        );
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn empty_query_is_rejected() {
        assert!(validate_query("").is_err());
        assert!(validate_query("   ").is_err());
        assert!(validate_query("cat").is_ok());
    }
}

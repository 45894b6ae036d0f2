//! ABOUTME: Inverted index built once per (context, strategy, options) and reused across queries
//! ABOUTME: Bound to the source content-hash so a stale index is detected rather than silently stale-served

use std::collections::HashMap;

use rlm_core::types::Chunk;

use crate::tokenizer::{tokenize, TokenizerMode};

/// Posting for a single chunk containing a term.
#[derive(Debug, Clone)]
pub struct Posting {
    pub doc_id: usize,
    pub term_freq: usize,
}

/// A lazily-built BM25 index over one decomposition's chunks.
pub struct IndexEntry {
    pub content_hash: String,
    pub tokenizer_mode: TokenizerMode,
    pub doc_count: usize,
    pub doc_lengths: Vec<usize>,
    pub avg_doc_length: f64,
    pub postings: HashMap<String, Vec<Posting>>,
    pub chunks: Vec<Chunk>,
}

impl IndexEntry {
    /// Tokenizes every chunk and accumulates term frequencies into an
    /// inverted index. `doc_id` is the chunk's position in `chunks`, which
    /// must match the chunk's own `index` field (decomposition order).
    #[must_use]
    pub fn build(content_hash: String, chunks: Vec<Chunk>, tokenizer_mode: TokenizerMode) -> Self {
        let mut doc_lengths = Vec::with_capacity(chunks.len());
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();

        for (doc_id, chunk) in chunks.iter().enumerate() {
            let tokens = tokenize(&chunk.content, tokenizer_mode);
            doc_lengths.push(tokens.len());

            let mut term_counts: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *term_counts.entry(token).or_insert(0) += 1;
            }
            for (term, term_freq) in term_counts {
                postings.entry(term).or_default().push(Posting { doc_id, term_freq });
            }
        }

        let doc_count = chunks.len();
        let avg_doc_length = if doc_count == 0 {
            0.0
        } else {
            doc_lengths.iter().sum::<usize>() as f64 / doc_count as f64
        };

        Self {
            content_hash,
            tokenizer_mode,
            doc_count,
            doc_lengths,
            avg_doc_length,
            postings,
            chunks,
        }
    }

    #[must_use]
    pub fn postings_for(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of chunks (documents) containing `term` at least once.
    #[must_use]
    pub fn doc_freq(&self, term: &str) -> usize {
        self.postings_for(term).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn builds_postings_with_term_frequencies() {
        let chunks = vec![chunk("the cat sat", 0), chunk("the cat and the cat", 1)];
        let index = IndexEntry::build("h".to_string(), chunks, TokenizerMode::Word);
        assert_eq!(index.doc_count, 2);
        assert_eq!(index.doc_freq("cat"), 2);
        let postings = index.postings_for("cat");
        assert_eq!(postings.iter().find(|p| p.doc_id == 1).unwrap().term_freq, 2);
        assert_eq!(index.doc_freq("sat"), 1);
    }

    #[test]
    fn empty_chunk_list_yields_empty_index() {
        let index = IndexEntry::build("h".to_string(), vec![], TokenizerMode::Word);
        assert_eq!(index.doc_count, 0);
        assert_eq!(index.avg_doc_length, 0.0);
    }
}

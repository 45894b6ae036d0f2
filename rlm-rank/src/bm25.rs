//! ABOUTME: Okapi BM25 scoring over an IndexEntry, with the classic k1=1.5, b=0.75 defaults
//! ABOUTME: Zero-score chunks (no query term present) are filtered from ranked results, never just sorted last

use serde::Serialize;

use crate::index::IndexEntry;
use crate::tokenizer::{tokenize, TokenizerMode};

#[derive(Debug, Clone, Serialize)]
pub struct RankedChunk {
    #[serde(rename = "chunkIndex")]
    pub chunk_index: usize,
    pub score: f64,
}

fn idf(doc_count: usize, doc_freq: usize) -> f64 {
    let n = doc_count as f64;
    let df = doc_freq as f64;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

fn score_document(index: &IndexEntry, doc_id: usize, query_terms: &[String], k1: f64, b: f64) -> f64 {
    let doc_len = index.doc_lengths[doc_id] as f64;
    let mut score = 0.0;
    for term in query_terms {
        let postings = index.postings_for(term);
        let Some(posting) = postings.iter().find(|p| p.doc_id == doc_id) else {
            continue;
        };
        let tf = posting.term_freq as f64;
        let df = index.doc_freq(term);
        let numerator = tf * (k1 + 1.0);
        let denominator = tf + k1 * (1.0 - b + b * (doc_len / index.avg_doc_length.max(f64::EPSILON)));
        score += idf(index.doc_count, df) * (numerator / denominator);
    }
    score
}

/// Ranks every chunk in `index` against `query`, dropping chunks whose score
/// is not strictly positive (no query term present, or the index is empty),
/// sorting descending by score, and truncating to `top_k`.
#[must_use]
pub fn rank(index: &IndexEntry, query: &str, top_k: usize, min_score: f64, k1: f64, b: f64) -> Vec<RankedChunk> {
    if index.doc_count == 0 {
        return Vec::new();
    }
    let query_terms = tokenize(query, index.tokenizer_mode);
    if query_terms.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<RankedChunk> = (0..index.doc_count)
        .map(|doc_id| RankedChunk {
            chunk_index: doc_id,
            score: score_document(index, doc_id, &query_terms, k1, b),
        })
        .filter(|r| r.score > 0.0 && r.score >= min_score)
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then(a.chunk_index.cmp(&b.chunk_index)));
    ranked.truncate(top_k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlm_core::types::Chunk;

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
    fn ranks_cat_query_in_expected_order() {
        let chunks = vec![
            chunk("the cat sat", 0),
            chunk("dogs bark", 1),
            chunk("the cat and the cat", 2),
        ];
        let index = IndexEntry::build("h".to_string(), chunks, TokenizerMode::Word);
        let ranked = rank(&index, "cat", 10, 0.0, 1.5, 0.75);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk_index, 2);
        assert_eq!(ranked[1].chunk_index, 0);
        assert!(ranked[0].score > ranked[1].score);
        assert!(ranked.iter().all(|r| r.chunk_index != 1));
    }

    #[test]
    fn more_term_occurrences_never_score_lower_all_else_equal() {
        let low = vec![chunk("cat dog bird fish tree", 0)];
        let high = vec![chunk("cat cat dog bird fish tree", 0)];
        let idx_low = IndexEntry::build("h".to_string(), low, TokenizerMode::Word);
        let idx_high = IndexEntry::build("h".to_string(), high, TokenizerMode::Word);
        let score_low = rank(&idx_low, "cat", 10, 0.0, 1.5, 0.75)[0].score;
        let score_high = rank(&idx_high, "cat", 10, 0.0, 1.5, 0.75)[0].score;
        assert!(score_high >= score_low);
    }

    #[test]
    fn empty_query_yields_no_results() {
        let chunks = vec![chunk("the cat sat", 0)];
        let index = IndexEntry::build("h".to_string(), chunks, TokenizerMode::Word);
        assert!(rank(&index, "   ", 10, 0.0, 1.5, 0.75).is_empty());
    }

    #[test]
    fn top_k_truncates_results() {
        let chunks = (0..5).map(|i| chunk("cat cat cat", i)).collect::<Vec<_>>();
        let index = IndexEntry::build("h".to_string(), chunks, TokenizerMode::Word);
        let ranked = rank(&index, "cat", 2, 0.0, 1.5, 0.75);
        assert_eq!(ranked.len(), 2);
    }
}

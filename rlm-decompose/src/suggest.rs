//! ABOUTME: rlm_suggest_strategy heuristics: named, observable constants rather than buried magic numbers
//! ABOUTME: Thresholds are exported so callers can inspect and tune them instead of guessing at magic numbers

use serde::Serialize;
use serde_json::{json, Value};

use rlm_session::context_store::detect_structure;
use rlm_core::types::Structure;

pub const LARGE_TEXT_LEN_THRESHOLD: usize = 50_000;
pub const MANY_PARAGRAPHS_THRESHOLD: usize = 10;
pub const MANY_LINES_THRESHOLD: usize = 200;
pub const DEFAULT_FIXED_CHUNK_SIZE: usize = 2_000;

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub strategy: String,
    pub options: Value,
    pub reason: String,
}

/// Recommends a chunking strategy from cheap structural signals. These
/// thresholds are intentionally simple heuristics, not learned or tuned
/// against a corpus; treat them as defaults a deployment can override.
#[must_use]
pub fn suggest_strategy(text: &str) -> Suggestion {
    let structure = detect_structure(text);
    let paragraph_count = text.split("\n\n").filter(|p| !p.trim().is_empty()).count();
    let line_count = text.lines().count();

    match structure {
        Structure::Markdown => Suggestion {
            strategy: "by_sections".to_string(),
            options: json!({}),
            reason: "text was detected as markdown; headers make natural chunk boundaries".to_string(),
        },
        Structure::Code | Structure::Log | Structure::Csv => Suggestion {
            strategy: "by_lines".to_string(),
            options: json!({"linesPerChunk": 50, "overlap": 0}),
            reason: format!("text was detected as {structure:?}; line-oriented chunking preserves structure"),
        },
        _ if paragraph_count > MANY_PARAGRAPHS_THRESHOLD => Suggestion {
            strategy: "by_paragraphs".to_string(),
            options: json!({}),
            reason: format!("text has {paragraph_count} paragraphs (> {MANY_PARAGRAPHS_THRESHOLD})"),
        },
        _ if line_count > MANY_LINES_THRESHOLD => Suggestion {
            strategy: "by_lines".to_string(),
            options: json!({"linesPerChunk": 50, "overlap": 0}),
            reason: format!("text has {line_count} lines (> {MANY_LINES_THRESHOLD})"),
        },
        _ if text.len() > LARGE_TEXT_LEN_THRESHOLD => Suggestion {
            strategy: "fixed_size".to_string(),
            options: json!({"chunkSize": DEFAULT_FIXED_CHUNK_SIZE, "overlap": 200}),
            reason: format!("text is {} bytes (> {LARGE_TEXT_LEN_THRESHOLD}); fixed windows bound chunk count", text.len()),
        },
        _ => Suggestion {
            strategy: "by_sentences".to_string(),
            options: json!({}),
            reason: "text is short prose with no strong structural signal".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_sections_for_markdown() {
        let s = suggest_strategy("# Title\n\nsome body\n\n## Sub\nmore body");
        assert_eq!(s.strategy, "by_sections");
    }

    #[test]
    fn suggests_paragraphs_for_many_paragraphs() {
        let text = (0..15).map(|i| format!("paragraph {i}")).collect::<Vec<_>>().join("\n\n");
        let s = suggest_strategy(&text);
        assert_eq!(s.strategy, "by_paragraphs");
    }

    #[test]
    fn suggests_fixed_size_for_large_plain_text() {
        let text = "word ".repeat(20_000);
        let s = suggest_strategy(&text);
        assert_eq!(s.strategy, "fixed_size");
    }
}

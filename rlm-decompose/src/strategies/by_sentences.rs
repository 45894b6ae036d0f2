//! ABOUTME: by_sentences strategy: punctuation-based sentence splitting, falls back to one chunk
//! ABOUTME: when no terminator exists at all

use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use rlm_core::types::Chunk;

use crate::error::Result;

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]+\s*").unwrap())
}

pub fn decompose(text: &str) -> Result<Vec<Chunk>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let matches: Vec<_> = sentence_re().find_iter(text).collect();
    if matches.is_empty() {
        return Ok(vec![Chunk {
            index: 0,
            start_offset: 0,
            end_offset: text.len(),
            content: text.to_string(),
            metadata: Some(json!({"type": "sentence"})),
        }]);
    }

    let mut chunks = Vec::new();
    let mut index = 0usize;
    for m in matches {
        let raw = m.as_str();
        let trimmed = raw.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        chunks.push(Chunk {
            index,
            start_offset: m.start(),
            end_offset: m.start() + trimmed.len(),
            content: trimmed.to_string(),
            metadata: Some(json!({"type": "sentence"})),
        });
        index += 1;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminators() {
        let chunks = decompose("Hello world. How are you? Fine!").unwrap();
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["Hello world.", "How are you?", "Fine!"]);
    }

    #[test]
    fn no_terminator_is_single_chunk() {
        let chunks = decompose("no terminator here").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "no terminator here");
    }

    #[test]
    fn offsets_match_original() {
        let text = "One. Two. Three.";
        let chunks = decompose(text).unwrap();
        for c in &chunks {
            assert_eq!(&text[c.start_offset..c.end_offset], c.content);
        }
    }
}

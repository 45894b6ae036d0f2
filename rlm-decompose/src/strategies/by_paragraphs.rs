//! ABOUTME: by_paragraphs strategy: split on runs of 2+ newlines, emit trimmed non-empty paragraphs
//! ABOUTME: Offsets point at the trimmed content's position in the original text, never the raw segment

use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use rlm_core::types::Chunk;

use crate::error::Result;

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{2,}").unwrap())
}

pub fn decompose(text: &str) -> Result<Vec<Chunk>> {
    let mut segments: Vec<(usize, usize)> = Vec::new();
    let mut last_end = 0usize;
    for m in separator_re().find_iter(text) {
        segments.push((last_end, m.start()));
        last_end = m.end();
    }
    segments.push((last_end, text.len()));

    let mut chunks = Vec::new();
    let mut index = 0usize;
    for (seg_start, seg_end) in segments {
        let segment = &text[seg_start..seg_end];
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        let leading_ws = segment.len() - segment.trim_start().len();
        let start_offset = seg_start + leading_ws;
        let end_offset = start_offset + trimmed.len();
        chunks.push(Chunk {
            index,
            start_offset,
            end_offset,
            content: trimmed.to_string(),
            metadata: Some(json!({"type": "paragraph"})),
        });
        index += 1;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines_and_trims() {
        let text = "first para\nstill first\n\n  second para  \n\n\nthird";
        let chunks = decompose(text).unwrap();
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first para\nstill first", "second para", "third"]);
    }

    #[test]
    fn offsets_point_into_original() {
        let text = "alpha\n\n  beta  \n\ngamma";
        let chunks = decompose(text).unwrap();
        for c in &chunks {
            assert_eq!(&text[c.start_offset..c.end_offset], c.content);
        }
    }
}

//! ABOUTME: by_sections strategy: Markdown headers split the text into preamble + per-header sections
//! ABOUTME: mergeEmptySections/minSectionLength can coalesce adjacent sections whose body is too short

use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use rlm_core::types::Chunk;

use crate::error::Result;
use crate::strategy::BySectionsOptions;

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.+?)[ \t]*$").unwrap())
}

struct RawSection {
    start: usize,
    end: usize,
    level: usize,
    title: String,
}

pub fn decompose(text: &str, opts: &BySectionsOptions) -> Result<Vec<Chunk>> {
    let headers: Vec<_> = header_re().captures_iter(text).collect();

    if headers.is_empty() {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![Chunk {
            index: 0,
            start_offset: 0,
            end_offset: text.len(),
            content: text.to_string(),
            metadata: Some(json!({"type": "single"})),
        }]);
    }

    let mut sections = Vec::new();
    for (i, cap) in headers.iter().enumerate() {
        let m = cap.get(0).unwrap();
        let level = cap.get(1).unwrap().as_str().len();
        let title = cap.get(2).unwrap().as_str().trim().to_string();
        let end = headers
            .get(i + 1)
            .map(|next| next.get(0).unwrap().start())
            .unwrap_or(text.len());
        sections.push(RawSection {
            start: m.start(),
            end,
            level,
            title,
        });
    }

    let mut chunks = Vec::new();
    let mut index = 0usize;

    let preamble_end = sections[0].start;
    if !text[..preamble_end].trim().is_empty() {
        let trimmed = text[..preamble_end].trim_end();
        chunks.push(Chunk {
            index,
            start_offset: 0,
            end_offset: trimmed.len(),
            content: trimmed.to_string(),
            metadata: Some(json!({"type": "preamble"})),
        });
        index += 1;
    }

    let mut merged: Vec<RawSection> = Vec::new();
    for section in sections {
        let body_len = body_length(text, &section);
        let should_merge = opts.merge_empty_sections && body_len < opts.min_section_length;
        if should_merge {
            if let Some(prev) = merged.last_mut() {
                prev.end = section.end;
                continue;
            }
        }
        merged.push(section);
    }

    for section in merged {
        let content = text[section.start..section.end].trim_end();
        chunks.push(Chunk {
            index,
            start_offset: section.start,
            end_offset: section.start + content.len(),
            content: content.to_string(),
            metadata: Some(json!({
                "level": section.level,
                "title": section.title,
                "type": "section",
                "tags": ["section", format!("level-{}", section.level)],
            })),
        });
        index += 1;
    }

    Ok(chunks)
}

fn body_length(text: &str, section: &RawSection) -> usize {
    let content = &text[section.start..section.end];
    match content.find('\n') {
        Some(nl) => content[nl + 1..].trim().len(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e2_sections_example() {
        let text = "intro\n# A\na1\n# B\nb1";
        let chunks = decompose(text, &BySectionsOptions::default()).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, "intro");
        assert_eq!(chunks[0].metadata.as_ref().unwrap()["type"], "preamble");
        assert_eq!(chunks[1].content, "# A\na1");
        assert_eq!(chunks[1].metadata.as_ref().unwrap()["level"], 1);
        assert_eq!(chunks[1].metadata.as_ref().unwrap()["title"], "A");
        assert_eq!(chunks[2].content, "# B\nb1");
        assert_eq!(chunks[2].metadata.as_ref().unwrap()["title"], "B");
    }

    #[test]
    fn no_headers_yields_single_chunk() {
        let chunks = decompose("just plain prose", &BySectionsOptions::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.as_ref().unwrap()["type"], "single");
    }

    #[test]
    fn merges_empty_sections_when_enabled() {
        let text = "# A\n\n# B\nreal content here";
        let opts = BySectionsOptions {
            merge_empty_sections: true,
            min_section_length: 1,
        };
        let chunks = decompose(text, &opts).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.contains("real content here"));
    }
}

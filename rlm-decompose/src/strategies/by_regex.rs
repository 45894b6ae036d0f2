//! ABOUTME: by_regex strategy: splits on a ReDoS-validated pattern, keeps original offsets for survivors
//! ABOUTME: Shares its pre-compile safety check with the Searcher via rlm_core::redos

use serde_json::json;

use rlm_core::redos::validate_and_compile;
use rlm_core::types::Chunk;

use crate::error::{DecomposeError, Result};
use crate::strategy::ByRegexOptions;

pub fn decompose(text: &str, opts: &ByRegexOptions) -> Result<Vec<Chunk>> {
    let re = validate_and_compile(&opts.pattern).map_err(|message| DecomposeError::InvalidRegex { message })?;

    let mut segments: Vec<(usize, usize)> = Vec::new();
    let mut last_end = 0usize;
    for m in re.find_iter(text) {
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
            metadata: Some(json!({"type": "regex"})),
        });
        index += 1;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_pattern() {
        let opts = ByRegexOptions {
            pattern: r",\s*".to_string(),
        };
        let chunks = decompose("a, b,c ,  d", &opts).unwrap();
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn e4_rejects_redos_pattern_before_compiling() {
        let opts = ByRegexOptions {
            pattern: "(a+)+b".to_string(),
        };
        assert!(matches!(decompose("aaaa", &opts), Err(DecomposeError::InvalidRegex { .. })));
    }
}

//! ABOUTME: by_lines strategy: windows of lines, offsets from a precomputed line-start table
//! ABOUTME: Line numbers are 0-indexed and recorded in metadata.{startLine,endLine,lineCount}

use serde_json::json;

use rlm_core::types::Chunk;

use crate::error::{DecomposeError, Result};
use crate::strategy::ByLinesOptions;

/// Byte offset of the start of each line, with the trailing empty line
/// dropped when the text ends with a newline (so `linesPerChunk` windows
/// over actual content lines, not a phantom final empty one).
fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0usize];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    if starts.len() > 1 && *starts.last().unwrap() == text.len() {
        starts.pop();
    }
    starts
}

pub fn decompose(text: &str, opts: &ByLinesOptions) -> Result<Vec<Chunk>> {
    if opts.lines_per_chunk == 0 {
        return Err(DecomposeError::InvalidInput {
            message: "linesPerChunk must be >= 1".to_string(),
        });
    }
    let step = (opts.lines_per_chunk as isize - opts.overlap as isize).max(1) as usize;

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let starts = line_starts(text);
    let line_count = starts.len();

    let mut chunks = Vec::new();
    let mut index = 0usize;
    let mut start_line = 0usize;
    while start_line < line_count {
        let end_line_exclusive = (start_line + opts.lines_per_chunk).min(line_count);
        let last_included = end_line_exclusive - 1;
        let start_offset = starts[start_line];
        let end_offset = if last_included + 1 < line_count {
            starts[last_included + 1] - 1
        } else {
            text.len()
        };
        chunks.push(Chunk {
            index,
            start_offset,
            end_offset,
            content: text[start_offset..end_offset].to_string(),
            metadata: Some(json!({
                "startLine": start_line,
                "endLine": last_included,
                "lineCount": end_line_exclusive - start_line,
            })),
        });
        index += 1;
        start_line += step;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_over_lines_with_overlap() {
        let text = "l0\nl1\nl2\nl3\nl4\n";
        let opts = ByLinesOptions {
            lines_per_chunk: 2,
            overlap: 1,
        };
        let chunks = decompose(text, &opts).unwrap();
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["l0\nl1", "l1\nl2", "l2\nl3", "l3\nl4", "l4"]);
    }

    #[test]
    fn offsets_point_into_original_text() {
        let text = "l0\nl1\nl2\n";
        let opts = ByLinesOptions {
            lines_per_chunk: 1,
            overlap: 0,
        };
        let chunks = decompose(text, &opts).unwrap();
        for c in &chunks {
            assert_eq!(&text[c.start_offset..c.end_offset], c.content);
        }
    }

    #[test]
    fn no_trailing_empty_chunk_for_trailing_newline() {
        let text = "only\n";
        let opts = ByLinesOptions {
            lines_per_chunk: 5,
            overlap: 0,
        };
        let chunks = decompose(text, &opts).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "only");
    }
}

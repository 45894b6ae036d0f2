//! ABOUTME: fixed_size strategy: step = chunkSize - overlap, raw character-window slicing
//! ABOUTME: Offsets are exact; content is the unmodified slice

use rlm_core::types::Chunk;

use crate::error::{DecomposeError, Result};
use crate::offsets::CharOffsets;
use crate::strategy::FixedSizeOptions;

pub fn decompose(text: &str, opts: &FixedSizeOptions) -> Result<Vec<Chunk>> {
    if opts.chunk_size == 0 {
        return Err(DecomposeError::InvalidInput {
            message: "chunkSize must be >= 1".to_string(),
        });
    }
    let step = opts.chunk_size as isize - opts.overlap as isize;
    if step <= 0 {
        return Err(DecomposeError::InvalidInput {
            message: "fixed_size: overlap must be smaller than chunkSize (step <= 0)".to_string(),
        });
    }
    let step = step as usize;

    let offsets = CharOffsets::new(text);
    let len_chars = offsets.len_chars();

    if len_chars == 0 {
        return Ok(Vec::new());
    }

    let mut chunks = Vec::new();
    let mut index = 0usize;
    let mut start_char = 0usize;
    while start_char < len_chars {
        let end_char = (start_char + opts.chunk_size).min(len_chars);
        let start_byte = offsets.byte_offset(start_char);
        let end_byte = offsets.byte_offset(end_char);
        chunks.push(Chunk {
            index,
            start_offset: start_byte,
            end_offset: end_byte,
            content: text[start_byte..end_byte].to_string(),
            metadata: None,
        });
        index += 1;
        start_char += step;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e1_fixed_size_offsets() {
        let opts = FixedSizeOptions {
            chunk_size: 4,
            overlap: 1,
        };
        let chunks = decompose("abcdefghij", &opts).unwrap();
        let rendered: Vec<(usize, usize, &str)> = chunks
            .iter()
            .map(|c| (c.start_offset, c.end_offset, c.content.as_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![(0, 4, "abcd"), (3, 7, "defg"), (6, 10, "ghij"), (9, 10, "j")]
        );
    }

    #[test]
    fn zero_or_negative_step_is_rejected() {
        let opts = FixedSizeOptions {
            chunk_size: 4,
            overlap: 4,
        };
        assert!(decompose("abcdefgh", &opts).is_err());
        let opts = FixedSizeOptions {
            chunk_size: 4,
            overlap: 5,
        };
        assert!(decompose("abcdefgh", &opts).is_err());
    }

    #[test]
    fn coverage_is_contiguous_with_no_overlap() {
        let opts = FixedSizeOptions {
            chunk_size: 3,
            overlap: 0,
        };
        let text = "abcdefghij";
        let chunks = decompose(text, &opts).unwrap();
        let mut expected_start = 0;
        for c in &chunks {
            assert_eq!(c.start_offset, expected_start);
            expected_start = c.end_offset;
        }
        assert_eq!(expected_start, text.len());
    }
}

//! ABOUTME: Precomputed line-start table for turning a byte offset into a 1-based line number
//! ABOUTME: Lookup is a binary search, so large contexts don't pay a linear scan per match

/// Byte offsets of the first character of every line in a text.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    #[must_use]
    pub fn build(text: &str) -> Self {
        let mut starts = vec![0usize];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' && i + 1 < text.len() {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// 1-based line number containing byte offset `offset`.
    #[must_use]
    pub fn line_at(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_line_number_for_offset() {
        let idx = LineIndex::build("one\ntwo\nthree");
        assert_eq!(idx.line_at(0), 1);
        assert_eq!(idx.line_at(3), 1);
        assert_eq!(idx.line_at(4), 2);
        assert_eq!(idx.line_at(8), 3);
        assert_eq!(idx.line_at(12), 3);
    }

    #[test]
    fn single_line_text_has_one_line() {
        let idx = LineIndex::build("no newlines here");
        assert_eq!(idx.line_at(0), 1);
        assert_eq!(idx.line_at(10), 1);
    }
}

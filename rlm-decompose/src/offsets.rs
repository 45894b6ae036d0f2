//! ABOUTME: Character-index <-> byte-offset bridge used by strategies that step over characters
//! ABOUTME: startOffset/endOffset are always byte offsets into the original text (UTF-8 safe)

/// Maps character indices to byte offsets for a piece of text, so
/// character-stepping strategies (fixed_size) can still emit byte offsets
/// that are safe to slice with and consistent with `ContextMetadata.length`.
pub struct CharOffsets {
    boundaries: Vec<usize>,
    total_bytes: usize,
}

impl CharOffsets {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        Self {
            boundaries,
            total_bytes: text.len(),
        }
    }

    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.boundaries.len()
    }

    /// Byte offset of the char at `char_idx`; `len_chars()` maps to the
    /// total byte length (one-past-the-end).
    #[must_use]
    pub fn byte_offset(&self, char_idx: usize) -> usize {
        self.boundaries.get(char_idx).copied().unwrap_or(self.total_bytes)
    }
}

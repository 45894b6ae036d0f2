//! ABOUTME: Substring scan (rlm_find_all): case-sensitive or not, capped at the same match limit as regex search
//! ABOUTME: Offsets are byte offsets into the original text, matching rlm_core::types::Chunk's convention

use serde::Serialize;

use crate::line_index::LineIndex;

#[derive(Debug, Clone, Serialize)]
pub struct SubstringMatch {
    pub offset: usize,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct SubstringSearchOptions {
    pub case_sensitive: bool,
    pub max_matches: usize,
}

impl Default for SubstringSearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            max_matches: 10_000,
        }
    }
}

/// Lowercases `text` char-by-char, recording for every byte of the
/// lowercased output which byte offset in `text` produced it. `to_lowercase`
/// is not always byte-length-preserving (e.g. `İ` U+0130 expands to two
/// bytes), so a match found in the lowercased string cannot be assumed to
/// land at the same offset in the original — this table is what lets a
/// match be translated back exactly.
fn lowercase_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut lowered = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len());
    for (byte_idx, ch) in text.char_indices() {
        for lc in ch.to_lowercase() {
            lowered.push(lc);
            offsets.push(byte_idx);
        }
    }
    (lowered, offsets)
}

/// Finds every non-overlapping occurrence of `needle` in `text`.
#[must_use]
pub fn find_all(text: &str, needle: &str, options: &SubstringSearchOptions) -> Vec<SubstringMatch> {
    if needle.is_empty() {
        return Vec::new();
    }

    let line_index = LineIndex::build(text);

    let mut matches = Vec::new();
    let mut search_from = 0usize;

    if options.case_sensitive {
        while let Some(found) = text[search_from..].find(needle) {
            if matches.len() >= options.max_matches {
                break;
            }
            let offset = search_from + found;
            matches.push(SubstringMatch {
                offset,
                line: line_index.line_at(offset),
            });
            search_from = offset + needle.len().max(1);
        }
    } else {
        let (haystack, offsets) = lowercase_with_offsets(text);
        let pattern = needle.to_lowercase();
        while let Some(found) = haystack[search_from..].find(&pattern) {
            if matches.len() >= options.max_matches {
                break;
            }
            let folded_offset = search_from + found;
            let offset = offsets[folded_offset];
            matches.push(SubstringMatch {
                offset,
                line: line_index.line_at(offset),
            });
            search_from = folded_offset + pattern.len().max(1);
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_case_sensitive_matches() {
        let matches = find_all("foo Foo foo", "foo", &SubstringSearchOptions::default());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].offset, 0);
        assert_eq!(matches[1].offset, 8);
    }

    #[test]
    fn finds_case_insensitive_matches() {
        let matches = find_all(
            "foo Foo foo",
            "foo",
            &SubstringSearchOptions {
                case_sensitive: false,
                max_matches: 10_000,
            },
        );
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn respects_max_matches_cap() {
        let text = "a".repeat(100);
        let matches = find_all(&text, "a", &SubstringSearchOptions { case_sensitive: true, max_matches: 3 });
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn empty_needle_yields_no_matches() {
        assert!(find_all("anything", "", &SubstringSearchOptions::default()).is_empty());
    }

    #[test]
    fn case_insensitive_offsets_survive_non_length_preserving_lowercasing() {
        // U+0130 (LATIN CAPITAL LETTER I WITH DOT ABOVE) lowercases to two
        // codepoints ("i" + combining dot above), so naive offset reuse
        // from a lowercased copy would desync here.
        let text = "x\u{0130}y";
        let matches = find_all(
            text,
            "i",
            &SubstringSearchOptions {
                case_sensitive: false,
                max_matches: 10,
            },
        );
        assert_eq!(matches.len(), 1);
        let offset = matches[0].offset;
        assert!(text.is_char_boundary(offset));
        assert_eq!(offset, 1);
    }
}

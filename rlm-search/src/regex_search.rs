//! ABOUTME: Regex search: pre-validates via rlm_core::redos, then enumerates matches under a wall-clock budget
//! ABOUTME: Zero-length matches advance by one character (at a UTF-8 boundary) rather than livelocking

use std::time::{Duration, Instant};

use rlm_core::redos::validate_and_compile;
use serde::Serialize;

use crate::error::{Result, SearchError};
use crate::line_index::LineIndex;

#[derive(Debug, Clone, Serialize)]
pub struct RegexMatch {
    pub offset: usize,
    pub line: usize,
    #[serde(rename = "match")]
    pub matched_text: String,
    pub groups: Vec<Option<String>>,
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegexSearchOptions {
    pub max_matches: usize,
    pub budget: Duration,
    pub context_chars: usize,
    pub compact: bool,
}

impl Default for RegexSearchOptions {
    fn default() -> Self {
        Self {
            max_matches: 10_000,
            budget: Duration::from_millis(1_000),
            context_chars: 50,
            compact: false,
        }
    }
}

fn next_boundary(text: &str, from: usize) -> usize {
    if from >= text.len() {
        return from + 1;
    }
    match text[from..].chars().next() {
        Some(c) => from + c.len_utf8(),
        None => from + 1,
    }
}

fn context_window(text: &str, start: usize, end: usize, context_chars: usize) -> String {
    let before_start = text[..start].char_indices().rev().nth(context_chars.saturating_sub(1)).map(|(i, _)| i).unwrap_or(0);
    let after_end = text[end..]
        .char_indices()
        .nth(context_chars)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[before_start..after_end].to_string()
}

/// Validates `pattern`, then enumerates matches against `text` until
/// `options.max_matches` is reached or `options.budget` elapses (yielding
/// `RegexTimeout`). Capture groups beyond group 0 are reported positionally.
pub fn search(text: &str, pattern: &str, options: &RegexSearchOptions) -> Result<Vec<RegexMatch>> {
    let re = validate_and_compile(pattern).map_err(|message| SearchError::InvalidRegex { message })?;
    let line_index = LineIndex::build(text);

    let start_time = Instant::now();
    let mut matches = Vec::new();
    let mut pos = 0usize;

    while pos <= text.len() {
        if matches.len() >= options.max_matches {
            break;
        }
        if start_time.elapsed() > options.budget {
            return Err(SearchError::RegexTimeout);
        }
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let m = caps.get(0).expect("group 0 always present on a match");

        let groups = (1..caps.len()).map(|i| caps.get(i).map(|g| g.as_str().to_string())).collect();
        let context = if options.compact {
            None
        } else {
            Some(context_window(text, m.start(), m.end(), options.context_chars))
        };

        matches.push(RegexMatch {
            offset: m.start(),
            line: line_index.line_at(m.start()),
            matched_text: m.as_str().to_string(),
            groups,
            context,
        });

        pos = if m.end() > m.start() { m.end() } else { next_boundary(text, m.end()) };
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_all_matches_with_line_numbers() {
        let text = "foo\nfoo bar\nbaz foo";
        let matches = search(text, "foo", &RegexSearchOptions::default()).unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].line, 1);
        assert_eq!(matches[1].line, 2);
        assert_eq!(matches[2].line, 3);
    }

    #[test]
    fn captures_named_groups() {
        let matches = search("2024-01-02", r"(\d{4})-(\d{2})-(\d{2})", &RegexSearchOptions::default()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].groups, vec![Some("2024".to_string()), Some("01".to_string()), Some("02".to_string())]);
    }

    #[test]
    fn zero_length_matches_advance_without_livelock() {
        let matches = search("abc", r"x*", &RegexSearchOptions::default()).unwrap();
        assert_eq!(matches.len(), 4);
    }

    #[test]
    fn e4_rejects_redos_pattern_before_compiling() {
        let err = search("aaaa", "(a+)+b", &RegexSearchOptions::default()).unwrap_err();
        assert!(matches!(err, SearchError::InvalidRegex { .. }));
    }

    #[test]
    fn compact_mode_omits_context() {
        let matches = search("hello world", "world", &RegexSearchOptions { compact: true, ..Default::default() }).unwrap();
        assert!(matches[0].context.is_none());
    }

    #[test]
    fn respects_max_matches_cap() {
        let text = "a".repeat(100);
        let matches = search(&text, "a", &RegexSearchOptions { max_matches: 5, ..Default::default() }).unwrap();
        assert_eq!(matches.len(), 5);
    }
}

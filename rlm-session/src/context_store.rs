//! ABOUTME: Context Store: metadata derivation and structure detection for a context's text
//! ABOUTME: Detection runs once per load/append, is deterministic, and short-circuits on first non-plain match

use std::sync::OnceLock;

use regex::Regex;
use rlm_core::types::{ContextMetadata, Structure};

fn markdown_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#{1,6}\s+\S").unwrap())
}

fn markdown_list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*([-*+]|\d+\.)\s+\S").unwrap())
}

fn code_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(fn|function|def|class|import|const|let|var|public|private|protected|package|#include|use|pub|return|if|for|while)\b",
        )
        .unwrap()
    })
}

fn log_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").unwrap())
}

/// Counts non-empty lines among the first `limit` lines and the number of
/// commas seen on each, for the CSV regularity heuristic.
fn csv_like(text: &str) -> bool {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();
    if lines.len() < 2 {
        return false;
    }
    let counts: Vec<usize> = lines.iter().map(|l| l.matches(',').count()).collect();
    let first = counts[0];
    first >= 1 && counts.iter().all(|c| *c == first)
}

fn xml_like(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with("<?xml") || (trimmed.starts_with('<') && trimmed.contains('>') && trimmed.contains("</"))
}

fn json_like(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
}

/// Detects the structural tag for a block of text using ordered,
/// short-circuiting heuristics: once an earlier rule matches, no later rule
/// is consulted. `Structure::Mixed` is part of the tagged enum's wire
/// contract but this ordered rule set never assigns it — the first rule
/// that hits wins outright, so no two signals are ever compared against
/// each other to justify a combined tag.
#[must_use]
pub fn detect_structure(text: &str) -> Structure {
    if text.trim().is_empty() {
        return Structure::PlainText;
    }

    if json_like(text) {
        return Structure::Json;
    }
    if xml_like(text) {
        return Structure::Xml;
    }
    if csv_like(text) {
        return Structure::Csv;
    }

    let markdown_hits = markdown_header_re().find_iter(text).count() + markdown_list_re().find_iter(text).count();
    if markdown_hits > 0 {
        return Structure::Markdown;
    }

    let code_hits = code_keyword_re().find_iter(text).count();
    if code_hits > 0 {
        return Structure::Code;
    }

    let log_hits = log_timestamp_re().find_iter(text).count();
    if log_hits > 0 {
        return Structure::Log;
    }

    Structure::PlainText
}

/// Derives the full metadata block for a piece of text: length, line count,
/// word count and structure.
#[must_use]
pub fn derive_metadata(text: &str) -> ContextMetadata {
    ContextMetadata {
        length: text.len(),
        line_count: text.lines().count(),
        word_count: text.split_whitespace().count(),
        structure: detect_structure(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json() {
        assert_eq!(detect_structure(r#"{"a": 1, "b": [1,2,3]}"#), Structure::Json);
    }

    #[test]
    fn detects_xml() {
        assert_eq!(detect_structure("<root><a>1</a></root>"), Structure::Xml);
    }

    #[test]
    fn detects_csv() {
        assert_eq!(detect_structure("a,b,c\n1,2,3\n4,5,6\n"), Structure::Csv);
    }

    #[test]
    fn detects_markdown() {
        assert_eq!(detect_structure("# Title\n\nsome text\n\n## Sub\nmore"), Structure::Markdown);
    }

    #[test]
    fn detects_code() {
        assert_eq!(
            detect_structure("fn main() {\n    let x = 1;\n    return x;\n}\n"),
            Structure::Code
        );
    }

    #[test]
    fn detects_log() {
        assert_eq!(
            detect_structure("2024-01-01T00:00:00 INFO starting\n2024-01-01T00:00:01 INFO ready\n"),
            Structure::Log
        );
    }

    #[test]
    fn falls_back_to_plain_text() {
        assert_eq!(detect_structure("just some ordinary prose here."), Structure::PlainText);
    }

    #[test]
    fn is_deterministic() {
        let text = "# Header\nfn code() {}\nfn more() {}\n2024-01-01T00:00:00 x\n2024-01-01T00:00:01 y";
        assert_eq!(detect_structure(text), detect_structure(text));
    }
}

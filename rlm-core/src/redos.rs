//! ABOUTME: ReDoS-shape pre-compile validation shared by the Decomposer's by_regex strategy and the Searcher
//! ABOUTME: Rejects known catastrophic-backtracking shapes before a pattern is ever compiled or executed

use std::sync::OnceLock;

use regex::Regex;

pub const MAX_PATTERN_LEN: usize = 500;

/// A pattern judged safe to compile, but with a softer warning attached
/// (e.g. many optional groups) that callers may surface without rejecting.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

fn nested_quantifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // (a+)+ , (a*)* , (a+)* , (a*)+ shapes: a quantified group whose sole
    // body is itself quantified.
    RE.get_or_init(|| Regex::new(r"\([^()]*[*+][^()]*\)[*+]").unwrap())
}

fn nested_group_quantifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // (...)+ or (...)* wrapping an inner group that is itself quantified:
    // ((a+)+)+ style chains, or alternation inside a quantified group that
    // also contains a quantified sub-group.
    RE.get_or_init(|| Regex::new(r"\([^()]*\([^()]*[*+?][^()]*\)[^()]*\)[*+]").unwrap())
}

fn excessive_alternation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^()]{0,80}(\|[^()]{0,80}){6,}\)").unwrap())
}

/// Rejects patterns that exceed the max length or match one of the known
/// ReDoS-prone shapes (nested quantifiers; nested-group quantifier;
/// excessive alternation). Returns warnings (not rejections) for high
/// counts of optional groups or alternations.
pub fn validate_pattern(pattern: &str) -> Result<ValidationReport, String> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(format!(
            "pattern exceeds maximum length of {MAX_PATTERN_LEN} characters"
        ));
    }
    if nested_quantifier_re().is_match(pattern) {
        return Err("pattern matches a nested-quantifier ReDoS shape, e.g. (a+)+".to_string());
    }
    if nested_group_quantifier_re().is_match(pattern) {
        return Err("pattern matches a nested-group-quantifier ReDoS shape".to_string());
    }
    if excessive_alternation_re().is_match(pattern) {
        return Err("pattern matches an excessive-alternation ReDoS shape".to_string());
    }

    let mut warnings = Vec::new();
    let optional_groups = pattern.matches(")?").count();
    if optional_groups > 5 {
        warnings.push(format!("pattern has {optional_groups} optional groups"));
    }
    let alternations = pattern.matches('|').count();
    if alternations > 10 {
        warnings.push(format!("pattern has {alternations} alternations"));
    }
    Ok(ValidationReport { warnings })
}

/// Validates then compiles a pattern, translating both validation and
/// compile failures into a single error string for the caller to wrap in
/// its own `INVALID_REGEX` variant.
pub fn validate_and_compile(pattern: &str) -> Result<Regex, String> {
    validate_pattern(pattern)?;
    Regex::new(pattern).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e4_rejects_catastrophic_backtracking_shape() {
        assert!(validate_pattern("(a+)+b").is_err());
    }

    #[test]
    fn accepts_ordinary_patterns() {
        assert!(validate_pattern(r"\d{4}-\d{2}-\d{2}").is_ok());
        assert!(validate_pattern(r"[A-Za-z0-9_-]+").is_ok());
    }

    #[test]
    fn rejects_overlong_patterns() {
        let pattern = "a".repeat(600);
        assert!(validate_pattern(&pattern).is_err());
    }

    #[test]
    fn warns_without_rejecting_on_many_alternations() {
        let pattern = format!("({})", (0..12).map(|i| format!("opt{i}")).collect::<Vec<_>>().join("|"));
        let report = validate_pattern(&pattern).unwrap();
        assert!(!report.warnings.is_empty());
    }
}

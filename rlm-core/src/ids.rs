//! ABOUTME: Identifier types and the validation rules shared by every RPC entry point
//! ABOUTME: Session ids are opaque strings; context ids and variable names follow fixed regexes

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session identifier. Generated server-side; the distinguished
/// `default` session bypasses generation entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

/// Session id reserved for clients that never call `createSession`.
pub const DEFAULT_SESSION: &str = "default";

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn default_session() -> Self {
        Self(DEFAULT_SESSION.to_string())
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_SESSION
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::default_session()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

fn context_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"))
}

fn variable_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
}

pub const MAX_CONTEXT_ID_LEN: usize = 100;
pub const MAX_VARIABLE_NAME_LEN: usize = 100;

const RESERVED_VARIABLE_NAMES: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// Validates a context id against `[A-Za-z0-9_-]+`, max 100 chars.
pub fn validate_context_id(id: &str) -> Result<(), String> {
    if id.is_empty() || id.len() > MAX_CONTEXT_ID_LEN {
        return Err(format!(
            "context id must be 1-{MAX_CONTEXT_ID_LEN} characters, got {}",
            id.len()
        ));
    }
    if !context_id_re().is_match(id) {
        return Err(format!(
            "context id '{id}' must match [A-Za-z0-9_-]+"
        ));
    }
    Ok(())
}

/// Validates a variable name against `[A-Za-z_][A-Za-z0-9_]*`, max 100 chars,
/// and rejects names that would shadow prototype-chain properties in the
/// sandbox's host environment.
pub fn validate_variable_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > MAX_VARIABLE_NAME_LEN {
        return Err(format!(
            "variable name must be 1-{MAX_VARIABLE_NAME_LEN} characters, got {}",
            name.len()
        ));
    }
    if !variable_name_re().is_match(name) {
        return Err(format!(
            "variable name '{name}' must match [A-Za-z_][A-Za-z0-9_]*"
        ));
    }
    if RESERVED_VARIABLE_NAMES.contains(&name) {
        return Err(format!("variable name '{name}' is reserved"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_context_ids() {
        assert!(validate_context_id("doc-1").is_ok());
        assert!(validate_context_id("A_b-9").is_ok());
    }

    #[test]
    fn rejects_invalid_context_ids() {
        assert!(validate_context_id("").is_err());
        assert!(validate_context_id("has space").is_err());
        assert!(validate_context_id("has/slash").is_err());
        assert!(validate_context_id(&"x".repeat(101)).is_err());
    }

    #[test]
    fn rejects_reserved_variable_names() {
        assert!(validate_variable_name("__proto__").is_err());
        assert!(validate_variable_name("constructor").is_err());
        assert!(validate_variable_name("prototype").is_err());
    }

    #[test]
    fn rejects_leading_digit_variable_names() {
        assert!(validate_variable_name("9abc").is_err());
        assert!(validate_variable_name("abc9").is_ok());
    }
}

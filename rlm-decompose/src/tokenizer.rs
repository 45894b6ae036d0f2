//! ABOUTME: The tokenizer-provider seam used by the `by_tokens` strategy, plus a default in-process impl
//! ABOUTME: The default approximates a BPE-style encoding well enough to reconstruct exact offsets

use std::sync::Arc;

use rlm_core::types::Value;

/// One encoded unit. The default provider keeps the decoded text inline so
/// `decode` never needs an external vocabulary lookup; a real subword
/// tokenizer (e.g. via the `tokenizers` crate) would instead carry numeric
/// ids and look pieces up in a loaded vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(pub String);

/// External capability turning text into tokens and back, selected by
/// model or encoding name.
pub trait TokenizerProvider: Send + Sync {
    fn encode(&self, text: &str) -> Vec<Token>;
    fn decode(&self, tokens: &[Token]) -> String;
    fn release(&self) {}
}

/// Deterministic, reversible default: splits text into maximal runs of
/// "word" (alphanumeric/underscore) vs "other" characters. Concatenating
/// the decoded tokens always reproduces the input exactly, which is what
/// lets `by_tokens` reconstruct character offsets by decoding token
/// prefixes and summing their lengths.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTokenizer;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl TokenizerProvider for DefaultTokenizer {
    fn encode(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut current_is_word: Option<bool> = None;

        for c in text.chars() {
            let word = is_word_char(c);
            match current_is_word {
                Some(prev) if prev == word => current.push(c),
                Some(_) => {
                    tokens.push(Token(std::mem::take(&mut current)));
                    current.push(c);
                    current_is_word = Some(word);
                }
                None => {
                    current.push(c);
                    current_is_word = Some(word);
                }
            }
        }
        if !current.is_empty() {
            tokens.push(Token(current));
        }
        tokens
    }

    fn decode(&self, tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.0.as_str()).collect()
    }
}

/// Resolves the tokenizer named by `model`/`encoding` options. The default
/// provider is the only one shipped in-process; any named model/encoding
/// maps onto it today (a real deployment would plug in e.g. the
/// `tokenizers` crate here without changing this function's signature).
#[must_use]
pub fn resolve_tokenizer(_options: &Value) -> Arc<dyn TokenizerProvider> {
    Arc::new(DefaultTokenizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_exactly() {
        let tok = DefaultTokenizer;
        for text in ["hello, world!", "", "a_b1 c2-d3", "  multi   space  "] {
            let tokens = tok.encode(text);
            assert_eq!(tok.decode(&tokens), text);
        }
    }

    #[test]
    fn groups_into_word_and_non_word_runs() {
        let tok = DefaultTokenizer;
        let tokens = tok.encode("foo bar");
        assert_eq!(tokens, vec![Token("foo".into()), Token(" ".into()), Token("bar".into())]);
    }
}

//! ABOUTME: Term tokenizer for BM25 indexing: word runs by default, CJK bigrams on request
//! ABOUTME: `auto` mode picks bigrams when the text is predominantly CJK, word runs otherwise

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    Word,
    Bigram,
    Auto,
}

impl Default for TokenizerMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl TokenizerMode {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "word" => Some(Self::Word),
            "bigram" => Some(Self::Bigram),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0xAC00..=0xD7A3
    )
}

/// Word-run tokenizer: lowercased maximal runs of alphanumeric characters,
/// which approximates Unicode `L`/`N` categories closely enough for ranking.
fn word_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Overlapping character bigrams over non-whitespace text, the usual
/// fallback for scripts without explicit word boundaries.
fn bigram_tokens(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).map(|c| c.to_ascii_lowercase()).collect();
    if chars.len() < 2 {
        return chars.iter().map(|c| c.to_string()).collect();
    }
    chars.windows(2).map(|w| w.iter().collect()).collect()
}

fn is_predominantly_cjk(text: &str) -> bool {
    let mut cjk = 0usize;
    let mut alnum = 0usize;
    for c in text.chars() {
        if is_cjk(c) {
            cjk += 1;
            alnum += 1;
        } else if c.is_alphanumeric() {
            alnum += 1;
        }
    }
    alnum > 0 && (cjk * 2) > alnum
}

#[must_use]
pub fn tokenize(text: &str, mode: TokenizerMode) -> Vec<String> {
    match mode {
        TokenizerMode::Word => word_tokens(text),
        TokenizerMode::Bigram => bigram_tokens(text),
        TokenizerMode::Auto => {
            if is_predominantly_cjk(text) {
                bigram_tokens(text)
            } else {
                word_tokens(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_tokens_lowercase_and_split_on_punctuation() {
        let tokens = tokenize("The Cat, sat.", TokenizerMode::Word);
        assert_eq!(tokens, vec!["the", "cat", "sat"]);
    }

    #[test]
    fn auto_mode_uses_bigrams_for_cjk_text() {
        let tokens = tokenize("\u{4E2D}\u{6587}\u{6D4B}\u{8BD5}", TokenizerMode::Auto);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn auto_mode_uses_words_for_latin_text() {
        let tokens = tokenize("hello world", TokenizerMode::Auto);
        assert_eq!(tokens, vec!["hello", "world"]);
    }
}

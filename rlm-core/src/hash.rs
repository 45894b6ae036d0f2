//! ABOUTME: Cheap content-hash sidecar used to bind cached artifacts to the text they were built from
//! ABOUTME: Samples length plus prefix/midpoint/suffix rather than hashing the whole text on every mutation

use sha2::{Digest, Sha256};

const SAMPLE_LEN: usize = 256;

/// A compact fingerprint of a context's content: cheap to recompute, good
/// enough to detect "this cache entry no longer matches the live text"
/// without rehashing potentially 100 MiB of content on every lookup.
#[must_use]
pub fn content_fingerprint(text: &str) -> String {
    let len = text.len();
    let prefix = sample(text, 0, SAMPLE_LEN);
    let mid_start = len / 2;
    let mid = sample(text, mid_start, SAMPLE_LEN);
    let suffix_start = len.saturating_sub(SAMPLE_LEN);
    let suffix = sample(text, suffix_start, SAMPLE_LEN);

    let mut hasher = Sha256::new();
    hasher.update(len.to_le_bytes());
    hasher.update(prefix.as_bytes());
    hasher.update(mid.as_bytes());
    hasher.update(suffix.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn sample(text: &str, start: usize, max_len: usize) -> &str {
    if start >= text.len() {
        return "";
    }
    let mut end = (start + max_len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut real_start = start;
    while !text.is_char_boundary(real_start) {
        real_start += 1;
    }
    &text[real_start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_for_identical_input() {
        assert_eq!(content_fingerprint("hello world"), content_fingerprint("hello world"));
    }

    #[test]
    fn changes_with_content() {
        assert_ne!(content_fingerprint("hello"), content_fingerprint("hello!"));
    }

    #[test]
    fn handles_empty_and_unicode() {
        let _ = content_fingerprint("");
        let _ = content_fingerprint("héllo wörld 日本語のテキスト");
    }
}

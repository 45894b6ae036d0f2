//! ABOUTME: One module per chunking strategy; each returns raw chunks before the shared MAX_CHUNKS guard
//! ABOUTME: Dispatched from `crate::decompose`, never called directly by RPC or session code

pub mod by_lines;
pub mod by_paragraphs;
pub mod by_regex;
pub mod by_sections;
pub mod by_sentences;
pub mod by_tokens;
pub mod fixed_size;

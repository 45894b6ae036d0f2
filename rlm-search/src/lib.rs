//! ABOUTME: Searcher: ReDoS-safe regex search and substring scan, cached by (session, context, kind, options, content-hash)
//! ABOUTME: Has no dependency on the Ranker or Decomposer; shares only rlm_core::redos validation with the by_regex strategy

pub mod cache;
pub mod error;
pub mod line_index;
pub mod regex_search;
pub mod substring_search;

pub mod prelude {
    pub use crate::cache::{query_key, QueryKind, SearchResultCache};
    pub use crate::error::{Result, SearchError};
    pub use crate::line_index::LineIndex;
    pub use crate::regex_search::{search, RegexMatch, RegexSearchOptions};
    pub use crate::substring_search::{find_all, SubstringMatch, SubstringSearchOptions};
}

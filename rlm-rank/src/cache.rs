//! ABOUTME: IndexEntry cache (one BM25 index per context/strategy/options) and a smaller query-result cache on top
//! ABOUTME: Both are content-hash bound and both implement CacheInvalidate so the session registry can drive eviction

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rlm_core::types::Value;
use rlm_session::invalidation::CacheInvalidate;

use crate::bm25::RankedChunk;
use crate::index::IndexEntry;

const KEY_SEP: char = '\u{0}';

fn key_prefix(session_id: &str, context_id: &str) -> String {
    format!("{session_id}{KEY_SEP}{context_id}{KEY_SEP}")
}

/// Canonical key for an IndexEntry: bound to session, context, decomposition
/// strategy, and the strategy's options (serialized via serde_json's
/// key-sorted default `Map`, so equivalent option bags collide on purpose).
#[must_use]
pub fn index_key(session_id: &str, context_id: &str, strategy: &str, options: &Value) -> String {
    format!(
        "{session_id}{KEY_SEP}{context_id}{KEY_SEP}{strategy}{KEY_SEP}{}",
        serde_json::to_string(options).unwrap_or_default()
    )
}

/// Canonical key for a cached query result: an IndexEntry key plus the
/// query-specific parameters that change the output.
#[must_use]
pub fn query_key(index_key: &str, query: &str, top_k: usize, min_score: f64, tokenizer: &str) -> String {
    format!("{index_key}{KEY_SEP}{query}{KEY_SEP}{top_k}{KEY_SEP}{min_score}{KEY_SEP}{tokenizer}")
}

/// LRU cache of built BM25 indexes, bound to the content-hash of the
/// decomposition's source text.
pub struct IndexCache {
    entries: DashMap<String, Arc<IndexEntry>>,
    hashes: DashMap<String, String>,
    recency: Mutex<VecDeque<String>>,
    max_entries: usize,
}

impl IndexCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            hashes: DashMap::new(),
            recency: Mutex::new(VecDeque::new()),
            max_entries,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str, content_hash: &str) -> Option<Arc<IndexEntry>> {
        let matches = self.hashes.get(key).map(|h| h.value() == content_hash).unwrap_or(false);
        if !matches {
            if self.entries.contains_key(key) {
                self.remove(key);
            }
            return None;
        }
        let hit = self.entries.get(key).map(|e| Arc::clone(e.value()));
        if hit.is_some() {
            self.touch(key);
        }
        hit
    }

    pub fn put(&self, key: String, content_hash: String, index: IndexEntry) -> Arc<IndexEntry> {
        let index = Arc::new(index);
        self.entries.insert(key.clone(), Arc::clone(&index));
        self.hashes.insert(key.clone(), content_hash);
        self.touch(&key);
        self.evict_if_needed();
        index
    }

    fn touch(&self, key: &str) {
        let mut recency = self.recency.lock();
        recency.retain(|k| k != key);
        recency.push_back(key.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
        self.hashes.remove(key);
        self.recency.lock().retain(|k| k != key);
    }

    fn evict_if_needed(&self) {
        while self.entries.len() > self.max_entries {
            let oldest = self.recency.lock().pop_front();
            match oldest {
                Some(key) => self.remove(&key),
                None => break,
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheInvalidate for IndexCache {
    fn invalidate_prefix(&self, session_id: &str, context_id: &str) {
        let prefix = key_prefix(session_id, context_id);
        let doomed: Vec<String> = self.entries.iter().map(|e| e.key().clone()).filter(|k| k.starts_with(&prefix)).collect();
        for key in doomed {
            self.remove(&key);
        }
    }

    fn invalidate_session(&self, session_id: &str) {
        let prefix = format!("{session_id}{KEY_SEP}");
        let doomed: Vec<String> = self.entries.iter().map(|e| e.key().clone()).filter(|k| k.starts_with(&prefix)).collect();
        for key in doomed {
            self.remove(&key);
        }
    }
}

/// Small cache of ranked query results on top of `IndexCache`, avoiding a
/// full BM25 pass when the same (index, query, params) is repeated.
pub struct QueryCache {
    entries: DashMap<String, Vec<RankedChunk>>,
    recency: Mutex<VecDeque<String>>,
    max_entries: usize,
}

impl QueryCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            recency: Mutex::new(VecDeque::new()),
            max_entries,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<RankedChunk>> {
        let hit = self.entries.get(key).map(|e| e.value().clone());
        if hit.is_some() {
            self.touch(key);
        }
        hit
    }

    pub fn put(&self, key: String, results: Vec<RankedChunk>) {
        self.entries.insert(key.clone(), results);
        self.touch(&key);
        self.evict_if_needed();
    }

    fn touch(&self, key: &str) {
        let mut recency = self.recency.lock();
        recency.retain(|k| k != key);
        recency.push_back(key.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
        self.recency.lock().retain(|k| k != key);
    }

    fn evict_if_needed(&self) {
        while self.entries.len() > self.max_entries {
            let oldest = self.recency.lock().pop_front();
            match oldest {
                Some(key) => self.remove(&key),
                None => break,
            }
        }
    }
}

impl CacheInvalidate for QueryCache {
    fn invalidate_prefix(&self, session_id: &str, context_id: &str) {
        let prefix = key_prefix(session_id, context_id);
        let doomed: Vec<String> = self.entries.iter().map(|e| e.key().clone()).filter(|k| k.starts_with(&prefix)).collect();
        for key in doomed {
            self.remove(&key);
        }
    }

    fn invalidate_session(&self, session_id: &str) {
        let prefix = format!("{session_id}{KEY_SEP}");
        let doomed: Vec<String> = self.entries.iter().map(|e| e.key().clone()).filter(|k| k.starts_with(&prefix)).collect();
        for key in doomed {
            self.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::TokenizerMode;
    use rlm_core::types::Chunk;

    fn chunk() -> Chunk {
        Chunk {
            index: 0,
            start_offset: 0,
            end_offset: 5,
            content: "hello".to_string(),
            metadata: None,
        }
    }

    #[test]
    fn index_cache_drops_stale_hash() {
        let cache = IndexCache::new(10);
        let key = index_key("s", "c", "fixed_size", &serde_json::json!({}));
        let index = IndexEntry::build("hash1".to_string(), vec![chunk()], TokenizerMode::Word);
        cache.put(key.clone(), "hash1".to_string(), index);
        assert!(cache.get(&key, "hash1").is_some());
        assert!(cache.get(&key, "hash2").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn query_cache_respects_capacity() {
        let cache = QueryCache::new(1);
        cache.put("a".to_string(), vec![]);
        cache.put("b".to_string(), vec![]);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn index_cache_invalidate_prefix_is_scoped() {
        let cache = IndexCache::new(10);
        let key_a = index_key("s", "a", "fixed_size", &serde_json::json!({}));
        let key_b = index_key("s", "b", "fixed_size", &serde_json::json!({}));
        cache.put(key_a.clone(), "h".to_string(), IndexEntry::build("h".to_string(), vec![chunk()], TokenizerMode::Word));
        cache.put(key_b.clone(), "h".to_string(), IndexEntry::build("h".to_string(), vec![chunk()], TokenizerMode::Word));
        cache.invalidate_prefix("s", "a");
        assert!(cache.get(&key_a, "h").is_none());
        assert!(cache.get(&key_b, "h").is_some());
    }
}

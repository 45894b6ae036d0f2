//! ABOUTME: Chunk cache: keyed by (session, context, strategy, canonicalized options) with a content-hash sidecar
//! ABOUTME: LRU-bounded on both entry count and estimated total bytes; invalidated via rlm_session::CacheInvalidate

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use rlm_core::types::{Chunk, Value};
use rlm_session::invalidation::CacheInvalidate;

const KEY_SEP: char = '\u{0}';

struct Entry {
    content_hash: String,
    chunks: Vec<Chunk>,
    bytes: usize,
}

/// LRU-bounded cache of decompositions, bound to the content-hash of the
/// source text they were built from.
pub struct ChunkCache {
    entries: DashMap<String, Entry>,
    recency: Mutex<VecDeque<String>>,
    max_entries: usize,
    max_bytes: usize,
    total_bytes: AtomicUsize,
}

fn estimate_chunks_bytes(chunks: &[Chunk]) -> usize {
    chunks.iter().map(|c| c.content.len() + 64).sum()
}

/// Serializes the option bag deterministically (serde_json's default `Map`
/// is key-sorted without the `preserve_order` feature) so equivalent option
/// bags always hash to the same cache key.
#[must_use]
pub fn cache_key(session_id: &str, context_id: &str, strategy: &str, options: &Value) -> String {
    format!(
        "{session_id}{KEY_SEP}{context_id}{KEY_SEP}{strategy}{KEY_SEP}{}",
        serde_json::to_string(options).unwrap_or_default()
    )
}

fn key_prefix(session_id: &str, context_id: &str) -> String {
    format!("{session_id}{KEY_SEP}{context_id}{KEY_SEP}")
}

impl ChunkCache {
    #[must_use]
    pub fn new(max_entries: usize, max_bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            recency: Mutex::new(VecDeque::new()),
            max_entries,
            max_bytes,
            total_bytes: AtomicUsize::new(0),
        }
    }

    /// Returns cached chunks only if the bound content-hash still matches;
    /// a stale match is dropped rather than returned.
    pub fn get(&self, key: &str, content_hash: &str) -> Option<Vec<Chunk>> {
        let hit = self.entries.get(key).and_then(|entry| {
            if entry.content_hash == content_hash {
                Some(entry.chunks.clone())
            } else {
                None
            }
        });
        if hit.is_some() {
            self.touch(key);
            return hit;
        }
        if self.entries.contains_key(key) {
            self.remove(key);
        }
        None
    }

    pub fn put(&self, key: String, content_hash: String, chunks: Vec<Chunk>) {
        let bytes = estimate_chunks_bytes(&chunks);
        if let Some(old) = self.entries.get(&key) {
            self.total_bytes.fetch_sub(old.bytes, Ordering::Relaxed);
        }
        self.entries.insert(
            key.clone(),
            Entry {
                content_hash,
                chunks,
                bytes,
            },
        );
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.touch(&key);
        self.evict_if_needed();
    }

    fn touch(&self, key: &str) {
        let mut recency = self.recency.lock();
        recency.retain(|k| k != key);
        recency.push_back(key.to_string());
    }

    fn remove(&self, key: &str) {
        if let Some((_, entry)) = self.entries.remove(key) {
            self.total_bytes.fetch_sub(entry.bytes, Ordering::Relaxed);
        }
        self.recency.lock().retain(|k| k != key);
    }

    fn evict_if_needed(&self) {
        loop {
            let over_entries = self.entries.len() > self.max_entries;
            let over_bytes = self.total_bytes.load(Ordering::Relaxed) > self.max_bytes;
            if !over_entries && !over_bytes {
                break;
            }
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

impl CacheInvalidate for ChunkCache {
    fn invalidate_prefix(&self, session_id: &str, context_id: &str) {
        let prefix = key_prefix(session_id, context_id);
        let doomed: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.key().clone())
            .filter(|k| k.starts_with(&prefix))
            .collect();
        for key in doomed {
            self.remove(&key);
        }
    }

    fn invalidate_session(&self, session_id: &str) {
        let prefix = format!("{session_id}{KEY_SEP}");
        let doomed: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.key().clone())
            .filter(|k| k.starts_with(&prefix))
            .collect();
        for key in doomed {
            self.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_chunk() -> Chunk {
        Chunk {
            index: 0,
            start_offset: 0,
            end_offset: 5,
            content: "hello".to_string(),
            metadata: None,
        }
    }

    #[test]
    fn stale_content_hash_is_dropped() {
        let cache = ChunkCache::new(10, 1_000_000);
        let key = cache_key("s", "c", "fixed_size", &json!({}));
        cache.put(key.clone(), "hash1".to_string(), vec![sample_chunk()]);
        assert!(cache.get(&key, "hash1").is_some());
        assert!(cache.get(&key, "hash2").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_prefix_only_removes_matching_context() {
        let cache = ChunkCache::new(10, 1_000_000);
        let key_a = cache_key("s", "a", "fixed_size", &json!({}));
        let key_b = cache_key("s", "b", "fixed_size", &json!({}));
        cache.put(key_a.clone(), "h".to_string(), vec![sample_chunk()]);
        cache.put(key_b.clone(), "h".to_string(), vec![sample_chunk()]);
        cache.invalidate_prefix("s", "a");
        assert!(cache.get(&key_a, "h").is_none());
        assert!(cache.get(&key_b, "h").is_some());
    }

    #[test]
    fn lru_evicts_oldest_entries_at_capacity() {
        let cache = ChunkCache::new(2, 1_000_000);
        let k1 = cache_key("s", "a", "x", &json!(1));
        let k2 = cache_key("s", "a", "x", &json!(2));
        let k3 = cache_key("s", "a", "x", &json!(3));
        cache.put(k1.clone(), "h".to_string(), vec![sample_chunk()]);
        cache.put(k2.clone(), "h".to_string(), vec![sample_chunk()]);
        cache.put(k3.clone(), "h".to_string(), vec![sample_chunk()]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&k1, "h").is_none());
    }
}

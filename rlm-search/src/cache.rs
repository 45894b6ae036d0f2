//! ABOUTME: Query-result cache for search/find_all, keyed by (session, context, query-kind, options, content-hash)
//! ABOUTME: LRU-bounded; implements CacheInvalidate so the session registry can drive eviction with the other caches

use std::collections::VecDeque;

use dashmap::DashMap;
use parking_lot::Mutex;
use rlm_session::invalidation::CacheInvalidate;
use serde_json::Value;

const KEY_SEP: char = '\u{0}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Search,
    FindAll,
}

impl QueryKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::FindAll => "find_all",
        }
    }
}

fn key_prefix(session_id: &str, context_id: &str) -> String {
    format!("{session_id}{KEY_SEP}{context_id}{KEY_SEP}")
}

#[must_use]
pub fn query_key(session_id: &str, context_id: &str, kind: QueryKind, options: &Value, content_hash: &str) -> String {
    format!(
        "{session_id}{KEY_SEP}{context_id}{KEY_SEP}{}{KEY_SEP}{}{KEY_SEP}{content_hash}",
        kind.as_str(),
        serde_json::to_string(options).unwrap_or_default()
    )
}

pub struct SearchResultCache<T> {
    entries: DashMap<String, T>,
    recency: Mutex<VecDeque<String>>,
    max_entries: usize,
}

impl<T: Clone> SearchResultCache<T> {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            recency: Mutex::new(VecDeque::new()),
            max_entries,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<T> {
        let hit = self.entries.get(key).map(|e| e.value().clone());
        if hit.is_some() {
            self.touch(key);
        }
        hit
    }

    pub fn put(&self, key: String, value: T) {
        self.entries.insert(key.clone(), value);
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

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone + Send + Sync> CacheInvalidate for SearchResultCache<T> {
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
    use serde_json::json;

    #[test]
    fn caches_and_evicts_lru() {
        let cache: SearchResultCache<Vec<usize>> = SearchResultCache::new(1);
        let k1 = query_key("s", "a", QueryKind::Search, &json!({"p": "x"}), "h1");
        let k2 = query_key("s", "a", QueryKind::Search, &json!({"p": "y"}), "h1");
        cache.put(k1.clone(), vec![1]);
        cache.put(k2.clone(), vec![2]);
        assert!(cache.get(&k1).is_none());
        assert_eq!(cache.get(&k2), Some(vec![2]));
    }

    #[test]
    fn invalidate_prefix_scopes_to_context() {
        let cache: SearchResultCache<Vec<usize>> = SearchResultCache::new(10);
        let k_a = query_key("s", "a", QueryKind::FindAll, &json!({}), "h");
        let k_b = query_key("s", "b", QueryKind::FindAll, &json!({}), "h");
        cache.put(k_a.clone(), vec![1]);
        cache.put(k_b.clone(), vec![2]);
        cache.invalidate_prefix("s", "a");
        assert!(cache.get(&k_a).is_none());
        assert!(cache.get(&k_b).is_some());
    }
}

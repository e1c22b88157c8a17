//! Least-recently-used cache of accepted work results.
//!
//! Keyed by the hash string exactly as callers send it.

use std::num::NonZeroUsize;

use lru::LruCache;
use powdist_types::WorkResult;

/// Bounded store of work results with least-recently-used eviction.
///
/// Entries never expire by age; only capacity pressure removes them. The
/// cache does not inspect the values it holds.
pub struct WorkCache {
    /// `None` when the capacity is zero: nothing is ever stored.
    entries: Option<LruCache<String, WorkResult>>,
    capacity: usize,
}

impl WorkCache {
    /// Create a new cache with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
            capacity,
        }
    }

    /// Look up a result, marking it most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<WorkResult> {
        self.entries.as_mut()?.get(key).cloned()
    }

    /// Insert or overwrite a result and mark it most recently used.
    ///
    /// Returns the key evicted to stay within capacity, if any. A cache with
    /// zero capacity stores nothing.
    pub fn set(&mut self, key: impl Into<String>, value: WorkResult) -> Option<String> {
        let entries = self.entries.as_mut()?;
        let key = key.into();
        // `push` also hands back the old entry when `key` was already cached;
        // only a different key means something was evicted.
        match entries.push(key.clone(), value) {
            Some((old, _)) if old != key => Some(old),
            _ => None,
        }
    }

    /// Membership test that leaves recency untouched.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.as_ref().is_some_and(|e| e.contains(key))
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<&str> {
        match &self.entries {
            Some(entries) => entries.iter().rev().map(|(k, _)| k.as_str()).collect(),
            None => Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WorkCache {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(work: &str) -> WorkResult {
        WorkResult::from_value(json!({ "work": work })).unwrap()
    }

    #[test]
    fn test_cache_set_and_get() {
        let mut cache = WorkCache::new(10);
        cache.set("h1", result("01"));
        assert_eq!(cache.get("h1"), Some(result("01")));
    }

    #[test]
    fn test_cache_miss() {
        let mut cache = WorkCache::new(10);
        assert_eq!(cache.get("h1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let mut cache = WorkCache::new(10);
        cache.set("h1", result("01"));
        cache.set("h1", result("02"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("h1"), Some(result("02")));
    }

    #[test]
    fn test_evicts_first_inserted() {
        let mut cache = WorkCache::new(2);
        assert_eq!(cache.set("h1", result("01")), None);
        assert_eq!(cache.set("h2", result("02")), None);
        assert_eq!(cache.set("h3", result("03")), Some("h1".to_string()));

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("h1"));
        assert!(cache.contains("h2"));
        assert!(cache.contains("h3"));
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut cache = WorkCache::new(2);
        cache.set("h1", result("01"));
        cache.set("h2", result("02"));
        assert!(cache.get("h1").is_some());

        // h2 is now least recently used.
        assert_eq!(cache.set("h3", result("03")), Some("h2".to_string()));
        assert!(cache.contains("h1"));
        assert!(cache.contains("h3"));
    }

    #[test]
    fn test_overwrite_refreshes_recency() {
        let mut cache = WorkCache::new(2);
        cache.set("h1", result("01"));
        cache.set("h2", result("02"));
        cache.set("h1", result("11"));
        assert_eq!(cache.keys_by_recency(), vec!["h2", "h1"]);
        assert_eq!(cache.set("h3", result("03")), Some("h2".to_string()));
    }

    #[test]
    fn test_contains_does_not_refresh() {
        let mut cache = WorkCache::new(2);
        cache.set("h1", result("01"));
        cache.set("h2", result("02"));
        assert!(cache.contains("h1"));
        assert_eq!(cache.set("h3", result("03")), Some("h1".to_string()));
    }

    #[test]
    fn test_zero_capacity() {
        let mut cache = WorkCache::new(0);
        assert_eq!(cache.set("h1", result("01")), None);
        assert!(cache.get("h1").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_overwrite_at_capacity_evicts_nothing() {
        let mut cache = WorkCache::new(2);
        cache.set("h1", result("01"));
        cache.set("h2", result("02"));
        assert_eq!(cache.set("h2", result("22")), None);
        assert_eq!(cache.keys_by_recency(), vec!["h1", "h2"]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(WorkCache::default().capacity(), 1000);
    }
}

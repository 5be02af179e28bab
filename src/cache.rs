//! # Result Cache
//!
//! Bounded least-recently-used memo for remote lookups, keyed by the remote
//! song id. One instance per lookup kind, owned by the client; nothing is
//! shared between client instances.
//!
//! Entries never expire by age. `comment_cache_time` in the configuration is
//! carried for compatibility but not enforced here.

use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;

/// LRU map from remote id to a cloned-out value.
#[derive(Debug)]
pub struct ResultCache<V> {
    name: &'static str,
    entries: LruCache<String, V>,
}

impl<V: Clone> ResultCache<V> {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            entries: LruCache::new(capacity),
        }
    }

    /// Look up and mark as most recently used.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let hit = self.entries.get(key).cloned();
        if hit.is_some() {
            debug!("{} cache hit: {key}", self.name);
        }
        hit
    }

    /// Insert, evicting the least recently used entry when full.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        // `push` also hands back the old pair when the key was already present.
        if let Some((evicted, _)) = self.entries.push(key.clone(), value) {
            if evicted != key {
                debug!("{} cache evicted: {evicted}", self.name);
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_exceeds_capacity() {
        let mut cache = ResultCache::new("test", 3);
        for i in 0..10 {
            cache.insert(i.to_string(), i);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_overflow_evicts_exactly_the_least_recently_used() {
        let mut cache = ResultCache::new("test", 3);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);

        // Touch "a" so "b" becomes the oldest.
        assert_eq!(cache.get("a"), Some(1));

        cache.insert("d", 4);
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("b"));
        assert!(cache.contains("a"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[test]
    fn test_reinserting_existing_key_does_not_evict() {
        let mut cache = ResultCache::new("test", 2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = ResultCache::new("test", 0);
        assert_eq!(cache.capacity(), 1);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_clear() {
        let mut cache = ResultCache::new("test", 4);
        cache.insert("a", vec![1, 2]);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }
}

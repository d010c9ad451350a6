//! Session-scoped memoization for generator results.
//!
//! Every media generator and the insight extractor is paid or slow (or
//! both), and the UI recomputes on each interaction. [`MemoCache`] keys each
//! result by its exact input text/prompt so repeated interactions on the
//! same page never re-invoke the external service.
//!
//! Deliberately minimal: no eviction, no TTL, no hashing of keys. Entries
//! live for the process lifetime; a reading session touches a few dozen
//! pages at most, so the cache stays small. Only *successful* results are
//! inserted — a failed call must be retryable by clicking again.

use std::collections::HashMap;

/// A string-keyed memo table for cloneable values.
#[derive(Debug)]
pub struct MemoCache<T> {
    entries: HashMap<String, T>,
}

// Manual impl: the derive would demand `T: Default`, which cached value
// types have no reason to provide.
impl<T> Default for MemoCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: Clone> MemoCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Look up a previously computed value for this exact key.
    pub fn get(&self, key: &str) -> Option<T> {
        self.entries.get(key).cloned()
    }

    /// Store a computed value under its input key.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), value);
    }

    /// Return the cached value, computing and storing it on a miss.
    ///
    /// For async computations use `get`/`insert` around the await point
    /// instead; this helper covers the synchronous case.
    pub fn get_or_insert_with(&mut self, key: &str, compute: impl FnOnce() -> T) -> T {
        if let Some(hit) = self.get(key) {
            return hit;
        }
        let value = compute();
        self.entries.insert(key.to_string(), value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn second_call_does_not_recompute() {
        let calls = Cell::new(0usize);
        let mut cache = MemoCache::new();

        let first = cache.get_or_insert_with("ambient drone", || {
            calls.set(calls.get() + 1);
            "wav-bytes".to_string()
        });
        let second = cache.get_or_insert_with("ambient drone", || {
            calls.set(calls.get() + 1);
            "different".to_string()
        });

        assert_eq!(calls.get(), 1, "underlying computation must run once");
        assert_eq!(first, second, "second call returns the cached value");
    }

    #[test]
    fn distinct_keys_compute_independently() {
        let mut cache = MemoCache::new();
        cache.insert("page one", 1u32);
        cache.insert("page two", 2u32);

        assert_eq!(cache.get("page one"), Some(1));
        assert_eq!(cache.get("page two"), Some(2));
        assert_eq!(cache.get("page three"), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn empty_string_is_a_valid_key() {
        let mut cache = MemoCache::new();
        cache.insert("", vec![0u8, 1, 2]);
        assert_eq!(cache.get(""), Some(vec![0, 1, 2]));
    }
}

//! Reading-progress persistence: content hash → last-viewed page.
//!
//! The store is a flat JSON object in a single file, rewritten in full after
//! every navigation event. That sounds wasteful but the mapping is tiny (one
//! entry per document ever opened) and a full rewrite keeps the on-disk
//! format trivially inspectable and diffable.
//!
//! ## Fails open
//!
//! A missing or corrupt file yields an *empty* store, never an error: losing
//! resume positions is an annoyance, refusing to open a book over it would be
//! a bug. Corruption is logged at warn level and the file is overwritten on
//! the next save.
//!
//! ## Bounded capacity
//!
//! Entries are capped at a configurable capacity; inserting a new document
//! beyond it evicts the least-recently-touched hash. Within a session
//! recency is exact; across restarts it is approximated by file iteration
//! order, which is acceptable for an eviction heuristic (the evicted entry
//! costs the user one remembered page number, nothing more).

use crate::error::CompanionError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persistent mapping from document content hash to last-viewed page (1-based).
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    capacity: usize,
    pages: HashMap<String, usize>,
    /// Hashes ordered least-recently-touched first.
    recency: Vec<String>,
}

impl ProgressStore {
    /// Load the store from `path`, or start empty if the file is missing or
    /// unreadable as JSON.
    ///
    /// `capacity` must be at least 1 (enforced by
    /// [`crate::config::CompanionConfigBuilder::build`]); a smaller value is
    /// bumped here as a safety net.
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let capacity = capacity.max(1);

        let pages: HashMap<String, usize> = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Progress file '{}' is corrupt ({}); starting empty", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        // Iteration order is arbitrary here; it only seeds the eviction
        // heuristic until entries are touched in this session.
        let recency: Vec<String> = pages.keys().cloned().collect();

        debug!("Loaded {} progress entries from '{}'", pages.len(), path.display());
        Self {
            path,
            capacity,
            pages,
            recency,
        }
    }

    /// Last-viewed page for a document, if one was recorded.
    pub fn get(&self, hash: &str) -> Option<usize> {
        self.pages.get(hash).copied()
    }

    /// Record the last-viewed page for a document and mark it most recent.
    ///
    /// Callers guarantee `page` is within `[1, page_count]` of the document;
    /// navigation clamps before recording.
    pub fn record(&mut self, hash: &str, page: usize) {
        if self.pages.insert(hash.to_string(), page).is_none() && self.pages.len() > self.capacity
        {
            if let Some(evicted) = self.recency.first().cloned() {
                self.pages.remove(&evicted);
                self.recency.remove(0);
                debug!("Progress store at capacity {}; evicted {}", self.capacity, evicted);
            }
        }

        self.touch(hash);
    }

    /// Overwrite the progress file with the current mapping.
    pub fn save(&self) -> Result<(), CompanionError> {
        let json = serde_json::to_string(&self.pages)
            .map_err(|e| CompanionError::Internal(format!("progress serialisation: {e}")))?;

        std::fs::write(&self.path, json).map_err(|source| CompanionError::ProgressWriteFailed {
            path: self.path.clone(),
            source,
        })
    }

    /// Number of documents with a recorded position.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True when no positions have been recorded.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move `hash` to the most-recently-touched end of the recency order.
    fn touch(&mut self, hash: &str) {
        if let Some(pos) = self.recency.iter().position(|h| h == hash) {
            self.recency.remove(pos);
        }
        self.recency.push(hash.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("pdf_progress.json")
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::load(store_path(&dir), 16);
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        std::fs::write(&path, "{ this is not json").unwrap();

        let store = ProgressStore::load(&path, 16);
        assert!(store.is_empty());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = ProgressStore::load(&path, 16);
        store.record("abc123", 7);
        store.save().unwrap();

        let reloaded = ProgressStore::load(&path, 16);
        assert_eq!(reloaded.get("abc123"), Some(7));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn record_overwrites_existing_entry() {
        let dir = TempDir::new().unwrap();
        let mut store = ProgressStore::load(store_path(&dir), 16);

        store.record("abc", 2);
        store.record("abc", 5);
        assert_eq!(store.get("abc"), Some(5));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn capacity_evicts_least_recently_touched() {
        let dir = TempDir::new().unwrap();
        let mut store = ProgressStore::load(store_path(&dir), 2);

        store.record("first", 1);
        store.record("second", 1);
        // Touch "first" so "second" becomes the eviction candidate.
        store.record("first", 3);
        store.record("third", 1);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("second"), None);
        assert_eq!(store.get("first"), Some(3));
        assert_eq!(store.get("third"), Some(1));
    }

    #[test]
    fn updating_at_capacity_does_not_evict() {
        let dir = TempDir::new().unwrap();
        let mut store = ProgressStore::load(store_path(&dir), 2);

        store.record("a", 1);
        store.record("b", 1);
        store.record("a", 9);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a"), Some(9));
        assert_eq!(store.get("b"), Some(1));
    }

    #[test]
    fn file_format_is_flat_hash_to_page() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = ProgressStore::load(&path, 16);
        store.record("deadbeef", 3);
        store.save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["deadbeef"], 3);
    }
}

//! Memoization of per-model metadata lookups
//!
//! Entries are keyed by model name and lookup name and are never invalidated
//! except by [`MetadataCache::clear`].
//!
//! # Thread Safety
//!
//! The cache uses `parking_lot::RwLock`, allowing concurrent readers. Two
//! threads missing the same key both compute the value; the first insert wins
//! and both observe an equal result.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// A cached list of names.
pub type Names = Arc<[String]>;

/// Thread-safe cache keyed by `(model, lookup)`.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<(String, &'static str), Names>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entry, computing and storing it on a miss.
    pub fn get_or_insert_with(
        &self,
        model: &str,
        lookup: &'static str,
        compute: impl FnOnce() -> Vec<String>,
    ) -> Names {
        if let Some(found) = self.entries.read().get(&(model.to_string(), lookup)) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(found);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let computed: Names = compute().into();
        let mut entries = self.entries.write();
        Arc::clone(
            entries
                .entry((model.to_string(), lookup))
                .or_insert(computed),
        )
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&self) {
        self.entries.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

//! Memoization of parsed catalog pairs.
//!
//! Entries are keyed by the load mode plus one freshness token per supplier:
//! the raw bytes for uploaded files, or the path and modification time for
//! bundled files. A changed upload or an edited bundled file therefore misses
//! the cache on the next load; [`CatalogCache::clear`] drops everything.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use quote_core::CatalogPair;

/// Where the catalogs of a load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceMode {
    Uploads,
    Bundled,
}

/// Identity of one catalog load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub mode: SourceMode,
    pub alpha: Vec<u8>,
    pub ben: Vec<u8>,
}

impl CacheKey {
    pub fn new(
        mode: SourceMode,
        alpha: impl Into<Vec<u8>>,
        ben: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            mode,
            alpha: alpha.into(),
            ben: ben.into(),
        }
    }
}

/// Read-mostly table of loaded catalog pairs, safe to share between threads.
#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: RwLock<HashMap<CacheKey, Arc<CatalogPair>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        key: &CacheKey,
    ) -> Option<Arc<CatalogPair>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Stores `catalogs` under `key`, replacing any previous entry, and
    /// returns the shared handle.
    pub fn insert(
        &self,
        key: CacheKey,
        catalogs: CatalogPair,
    ) -> Arc<CatalogPair> {
        let catalogs = Arc::new(catalogs);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, Arc::clone(&catalogs));
        catalogs
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

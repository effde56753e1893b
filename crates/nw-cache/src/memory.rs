//! In-process cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Cache, CacheBucket};

type Entries = HashMap<(String, String), (String, Vec<u8>)>;

/// [`Cache`] held in memory for the lifetime of the value.
///
/// Buckets opened from the same cache share storage, so a value written
/// through one handle is visible through another.
#[derive(Default, Clone)]
pub struct MemoryCache {
    entries: Arc<Mutex<Entries>>,
}

impl MemoryCache {
    /// Number of stored entries across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryBucket {
            name: name.to_owned(),
            entries: Arc::clone(&self.entries),
        })
    }
}

struct MemoryBucket {
    name: String,
    entries: Arc<Mutex<Entries>>,
}

impl MemoryBucket {
    fn slot(&self, key: &str) -> (String, String) {
        (self.name.clone(), key.to_owned())
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut Entries) -> T) -> T {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut entries)
    }
}

impl CacheBucket for MemoryBucket {
    fn etag(&self, key: &str) -> Option<String> {
        let slot = self.slot(key);
        self.with_entries(|entries| entries.get(&slot).map(|(etag, _)| etag.clone()))
    }

    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let slot = self.slot(key);
        self.with_entries(|entries| {
            let (stored, value) = entries.get(&slot)?;
            (etag.is_empty() || stored == etag).then(|| value.clone())
        })
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let slot = self.slot(key);
        self.with_entries(|entries| {
            entries.insert(slot, (etag.to_owned(), value.to_vec()));
        });
    }

    fn remove(&self, key: &str) {
        let slot = self.slot(key);
        self.with_entries(|entries| {
            entries.remove(&slot);
        });
    }
}

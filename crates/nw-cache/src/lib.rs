//! Etag-validated cache buckets for nodeweb builds.
//!
//! A [`Cache`] hands out named [`CacheBucket`]s. Each bucket maps a key to a
//! value plus an etag, so a caller can ask two questions cheaply:
//!
//! - did this key change since the last build? ([`CacheBucket::etag`])
//! - give me the last stored value ([`CacheBucket::get`])
//!
//! The dataset fetch phase uses a `datasets` bucket keyed by dataset name with
//! the content digest as etag.
//!
//! # Implementations
//!
//! - [`NullCache`]: caching disabled, every lookup misses
//! - [`MemoryCache`]: process-local, used in tests
//! - [`FileCache`]: persistent, one directory per bucket
//!
//! # Example
//!
//! ```
//! use nw_cache::{Cache, MemoryCache};
//!
//! let cache = MemoryCache::default();
//! let bucket = cache.bucket("datasets");
//! bucket.set("releases", "abc123", b"[]");
//! assert_eq!(bucket.etag("releases").as_deref(), Some("abc123"));
//! assert_eq!(bucket.get("releases", "other"), None);
//! ```

mod ext;
mod file;
mod memory;

pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition of a [`Cache`].
///
/// Writes never fail from the caller's point of view: a cache that cannot
/// persist an entry behaves like a miss on the next read.
pub trait CacheBucket: Send + Sync {
    /// Etag stored for `key`, if any.
    fn etag(&self, key: &str) -> Option<String>;

    /// Value stored for `key`.
    ///
    /// Misses when the stored etag differs from `etag`. An empty `etag`
    /// accepts any stored entry.
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, etag: &str, value: &[u8]);

    /// Drop the entry for `key`.
    fn remove(&self, key: &str);
}

/// Factory for isolated [`CacheBucket`]s.
pub trait Cache: Send + Sync {
    /// Open a bucket by name (e.g. `datasets`).
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// Bucket of a [`NullCache`].
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn etag(&self, _key: &str) -> Option<String> {
        None
    }

    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}

    fn remove(&self, _key: &str) {}
}

/// Cache used when caching is disabled (`--no-cache`).
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

/// Whether `key` is safe to use as a single file name.
///
/// Keys are flat: no separators, no parent references, no hidden names.
pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && !key.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_cache_never_stores() {
        let bucket = NullCache.bucket("datasets");

        bucket.set("releases", "digest", b"[]");

        assert_eq!(bucket.etag("releases"), None);
        assert_eq!(bucket.get("releases", ""), None);
    }

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key("releases"));
        assert!(is_valid_key("nvm-latest.json"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("../escape"));
        assert!(!is_valid_key("nested/key"));
        assert!(!is_valid_key(".hidden"));
    }
}

//! Typed access to cache buckets.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// JSON helpers available on every [`CacheBucket`].
pub trait CacheBucketExt: CacheBucket {
    /// Deserialize the value stored for `key`.
    ///
    /// Misses on etag mismatch or when the stored bytes no longer decode.
    fn get_json<T: DeserializeOwned>(&self, key: &str, etag: &str) -> Option<T> {
        let bytes = self.get(key, etag)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Serialize `value` as JSON and store it.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, etag: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, etag, &bytes),
            Err(e) => tracing::debug!(key, error = %e, "Failed to serialize cache entry"),
        }
    }

    /// Whether `key` is stored with exactly `etag`.
    fn is_fresh(&self, key: &str, etag: &str) -> bool {
        self.etag(key).is_some_and(|stored| stored == etag)
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

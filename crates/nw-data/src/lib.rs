//! External dataset fetchers for the nodeweb site builder.
//!
//! Each [`DatasetSource`] names a URL and a normalization step. [`fetch_all`]
//! fetches every source in parallel on the rayon pool and either returns all
//! datasets or the first failure. Every [`Dataset`] carries a content digest
//! used to detect unchanged data between builds.

mod error;
mod http;
mod sources;
mod version;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use nw_cache::{CacheBucket, CacheBucketExt};

pub use error::{FetchError, FetchErrorKind};
pub use http::{HttpFetch, MemoryFetch, UreqFetch, create_agent};
pub use sources::{
    BannersSource, DEFAULT_BANNERS_URL, DEFAULT_NVM_URL, DEFAULT_RELEASES_URL, DatasetSource,
    NvmSource, ReleasesSource, standard_sources,
};
pub use version::compare_versions;

/// Cache bucket holding the last published payload of each dataset.
pub const DATASET_BUCKET: &str = "datasets";

/// A fetched and normalized dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Source name.
    pub name: String,
    /// Hex SHA-256 of the canonical JSON payload.
    pub digest: String,
    /// Normalized payload.
    pub payload: Value,
}

impl Dataset {
    /// Create a dataset, computing its digest.
    #[must_use]
    pub fn new(name: &str, payload: Value) -> Self {
        Self {
            name: name.to_owned(),
            digest: digest(&payload),
            payload,
        }
    }
}

/// Hex SHA-256 over the canonical JSON encoding of `payload`.
///
/// Object keys serialize in sorted order, so equal values always hash the
/// same regardless of the key order of the source document.
#[must_use]
pub fn digest(payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Fetch and normalize a single source.
///
/// # Errors
///
/// Returns a [`FetchError`] naming the source on transport or payload
/// failure.
pub fn fetch_one(source: &dyn DatasetSource, http: &dyn HttpFetch) -> Result<Dataset, FetchError> {
    let name = source.name();
    tracing::debug!(dataset = name, url = source.url(), "Fetching dataset");

    let body = http
        .get(source.url())
        .map_err(|kind| FetchError::new(name, kind))?;
    let payload = source
        .normalize(&body)
        .map_err(|kind| FetchError::new(name, kind))?;

    Ok(Dataset::new(name, payload))
}

/// Fetch every source in parallel.
///
/// Datasets are returned in source order. The first failure is returned and
/// no dataset is published; remaining fetches are skipped where possible.
///
/// # Errors
///
/// Returns the [`FetchError`] of a failing source.
pub fn fetch_all(
    sources: &[Box<dyn DatasetSource>],
    http: &dyn HttpFetch,
) -> Result<Vec<Dataset>, FetchError> {
    let datasets = sources
        .par_iter()
        .map(|source| fetch_one(source.as_ref(), http))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(count = datasets.len(), "Datasets fetched");
    Ok(datasets)
}

/// Whether a dataset differs from the previous build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Digest differs from the cached one, or nothing was cached.
    Changed,
    /// Digest matches the cached one.
    Unchanged,
}

/// Compare datasets against the cache and record the new payloads.
///
/// Returns one [`Freshness`] per dataset, in input order.
pub fn sync_cache(datasets: &[Dataset], bucket: &dyn CacheBucket) -> Vec<Freshness> {
    datasets
        .iter()
        .map(|dataset| {
            if bucket.is_fresh(&dataset.name, &dataset.digest) {
                tracing::debug!(dataset = %dataset.name, "Dataset unchanged");
                Freshness::Unchanged
            } else {
                bucket.set_json(&dataset.name, &dataset.digest, &dataset.payload);
                tracing::debug!(dataset = %dataset.name, digest = %dataset.digest, "Dataset changed");
                Freshness::Changed
            }
        })
        .collect()
}

/// Datasets from the last successful fetch, for offline builds.
///
/// Like [`fetch_all`], this is all or nothing.
///
/// # Errors
///
/// Returns [`FetchErrorKind::NotCached`] for the first source with no cached
/// payload.
pub fn load_cached(
    sources: &[Box<dyn DatasetSource>],
    bucket: &dyn CacheBucket,
) -> Result<Vec<Dataset>, FetchError> {
    sources
        .iter()
        .map(|source| {
            let name = source.name();
            let payload: Value = bucket
                .get_json(name, "")
                .ok_or_else(|| FetchError::new(name, FetchErrorKind::NotCached))?;
            Ok(Dataset::new(name, payload))
        })
        .collect()
}

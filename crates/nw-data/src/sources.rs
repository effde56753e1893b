//! Dataset sources and their payload normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchErrorKind;
use crate::version::compare_versions;

/// Node.js release schedule.
pub const DEFAULT_RELEASES_URL: &str =
    "https://raw.githubusercontent.com/nodejs/Release/main/schedule.json";
/// Website banners.
pub const DEFAULT_BANNERS_URL: &str = "https://nodejs.org/site.json";
/// Latest nvm release.
pub const DEFAULT_NVM_URL: &str = "https://api.github.com/repos/nvm-sh/nvm/releases/latest";

/// An external dataset fetched during the build.
pub trait DatasetSource: Send + Sync {
    /// Dataset name, used for the output file and the cache key.
    fn name(&self) -> &str;

    /// URL to fetch.
    fn url(&self) -> &str;

    /// Turn the response body into the published payload.
    ///
    /// # Errors
    ///
    /// Returns [`FetchErrorKind::Json`] or [`FetchErrorKind::Shape`] when the
    /// body cannot be interpreted.
    fn normalize(&self, body: &[u8]) -> Result<Value, FetchErrorKind>;
}

/// The three datasets the site consumes.
#[must_use]
pub fn standard_sources(
    releases_url: &str,
    banners_url: &str,
    nvm_url: &str,
) -> Vec<Box<dyn DatasetSource>> {
    vec![
        Box::new(ReleasesSource::new(releases_url)),
        Box::new(BannersSource::new(banners_url)),
        Box::new(NvmSource::new(nvm_url)),
    ]
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, FetchErrorKind> {
    serde_json::to_value(value).map_err(|e| FetchErrorKind::Shape(e.to_string()))
}

// Release schedule

/// Release schedule, one entry per major line.
///
/// Input: `{ "v18": { "start": ..., "lts": ..., "maintenance": ..., "end": ..., "codename": ... } }`.
/// Output: a list ordered by version with an `isLts` flag.
#[derive(Debug, Clone)]
pub struct ReleasesSource {
    url: String,
}

impl ReleasesSource {
    /// Create a source fetching from `url`.
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self { url: url.to_owned() }
    }
}

#[derive(Deserialize)]
struct ScheduleEntry {
    start: String,
    lts: Option<String>,
    maintenance: Option<String>,
    end: String,
    codename: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Release {
    version: String,
    start: String,
    lts: Option<String>,
    maintenance: Option<String>,
    end: String,
    codename: Option<String>,
    is_lts: bool,
}

impl DatasetSource for ReleasesSource {
    fn name(&self) -> &str {
        "releases"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn normalize(&self, body: &[u8]) -> Result<Value, FetchErrorKind> {
        let schedule: BTreeMap<String, ScheduleEntry> = serde_json::from_slice(body)?;

        let mut releases: Vec<Release> = schedule
            .into_iter()
            .map(|(version, entry)| Release {
                is_lts: entry.lts.is_some(),
                version,
                start: entry.start,
                lts: entry.lts,
                maintenance: entry.maintenance,
                end: entry.end,
                codename: entry.codename,
            })
            .collect();
        releases.sort_by(|a, b| compare_versions(&a.version, &b.version));

        to_value(&releases)
    }
}

// Banners

/// Website banners keyed by placement.
///
/// Accepts `websiteBanners` or `banners` at the top level. A document with
/// neither yields an empty list.
#[derive(Debug, Clone)]
pub struct BannersSource {
    url: String,
}

impl BannersSource {
    /// Create a source fetching from `url`.
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self { url: url.to_owned() }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteDocument {
    website_banners: Option<BTreeMap<String, Banner>>,
    banners: Option<BTreeMap<String, Banner>>,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Banner {
    start_date: String,
    end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

#[derive(Serialize)]
struct KeyedBanner {
    key: String,
    #[serde(flatten)]
    banner: Banner,
}

impl DatasetSource for BannersSource {
    fn name(&self) -> &str {
        "banners"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn normalize(&self, body: &[u8]) -> Result<Value, FetchErrorKind> {
        let document: SiteDocument = serde_json::from_slice(body)?;
        let banners: Vec<KeyedBanner> = document
            .website_banners
            .or(document.banners)
            .unwrap_or_default()
            .into_iter()
            .map(|(key, banner)| KeyedBanner { key, banner })
            .collect();

        to_value(&banners)
    }
}

// nvm

/// Latest nvm release tag from the GitHub releases API.
#[derive(Debug, Clone)]
pub struct NvmSource {
    url: String,
}

impl NvmSource {
    /// Create a source fetching from `url`.
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self { url: url.to_owned() }
    }
}

#[derive(Deserialize)]
struct GithubRelease {
    tag_name: String,
}

#[derive(Serialize)]
struct NvmLatest {
    version: String,
}

impl DatasetSource for NvmSource {
    fn name(&self) -> &str {
        "nvm"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn normalize(&self, body: &[u8]) -> Result<Value, FetchErrorKind> {
        let release: GithubRelease = serde_json::from_slice(body)?;
        to_value(&NvmLatest {
            version: release.tag_name,
        })
    }
}

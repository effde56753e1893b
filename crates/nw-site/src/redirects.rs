//! Locale-aware redirect table.
//!
//! Pairs are accumulated in a fixed order: API default redirects (each with
//! a legacy `.html` variant), the API seed redirects, then the hand-authored
//! static map. Every pair is then expanded once without a locale and once per
//! supported locale.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::SiteError;

/// HTTP status attached to every redirect entry.
///
/// Entries are permanent redirects performed in the browser; the hosting
/// layer expects status 200 on them.
pub const REDIRECT_STATUS: u16 = 200;

/// A single emitted redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectEntry {
    /// Source path.
    pub from_path: String,
    /// Target path or absolute URL.
    pub to_path: String,
    /// Always `true`.
    pub is_permanent: bool,
    /// Always `true`.
    pub redirect_in_browser: bool,
    /// Always [`REDIRECT_STATUS`].
    pub status_code: u16,
}

impl RedirectEntry {
    fn new(from_path: String, to_path: String) -> Self {
        Self {
            from_path,
            to_path,
            is_permanent: true,
            redirect_in_browser: true,
            status_code: REDIRECT_STATUS,
        }
    }
}

/// Ordered `from -> to` pairs with last-write-wins replacement.
#[derive(Debug, Default)]
struct PairList {
    pairs: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl PairList {
    fn insert(&mut self, from: String, to: String) {
        if let Some(&i) = self.index.get(&from) {
            let previous = &mut self.pairs[i].1;
            if *previous != to {
                tracing::warn!(from = %from, previous = %previous, to = %to, "Redirect collision, later target wins");
            }
            *previous = to;
        } else {
            self.index.insert(from.clone(), self.pairs.len());
            self.pairs.push((from, to));
        }
    }
}

/// Emitted redirect entries, unique by `from_path`.
#[derive(Debug, Default, Clone)]
pub struct RedirectTable {
    entries: Vec<RedirectEntry>,
    index: HashMap<String, usize>,
}

impl RedirectTable {
    /// Insert an entry, replacing any entry with the same `from_path` in place.
    pub fn insert(&mut self, entry: RedirectEntry) {
        if let Some(&i) = self.index.get(&entry.from_path) {
            tracing::debug!(from = %entry.from_path, "Replacing redirect entry");
            self.entries[i] = entry;
        } else {
            self.index.insert(entry.from_path.clone(), self.entries.len());
            self.entries.push(entry);
        }
    }

    /// Entry for `from_path`.
    #[must_use]
    pub fn get(&self, from_path: &str) -> Option<&RedirectEntry> {
        self.index.get(from_path).map(|&i| &self.entries[i])
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[RedirectEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// API seed: the API root and latest version lead to the landing page.
#[derive(Debug, Clone)]
pub struct ApiSeed<'a> {
    /// API URL root, e.g. `/api`.
    pub root: &'a str,
    /// Latest API version.
    pub latest: &'a str,
    /// Landing page segment, e.g. `documentation`.
    pub landing: &'a str,
}

/// Builds a [`RedirectTable`].
#[derive(Debug, Default)]
pub struct RedirectTableBuilder {
    pairs: PairList,
}

impl RedirectTableBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add API default redirects with their legacy `.html` variants.
    #[must_use]
    pub fn api_defaults(mut self, redirects: &[(String, String)]) -> Self {
        for (from, to) in redirects {
            self.pairs.insert(from.clone(), to.clone());
            self.pairs.insert(html_variant(from), to.clone());
        }
        self
    }

    /// Add the API root and latest-version seeds.
    #[must_use]
    pub fn api_seed(mut self, seed: Option<&ApiSeed<'_>>) -> Self {
        if let Some(seed) = seed {
            let root = seed.root.trim_end_matches('/');
            let landing = format!("{root}/{}/{}/", seed.latest, seed.landing);
            self.pairs.insert(format!("{root}/"), landing.clone());
            self.pairs.insert(format!("{root}/{}/", seed.latest), landing);
        }
        self
    }

    /// Add the static redirect map.
    #[must_use]
    pub fn static_map(mut self, redirects: &[(String, String)]) -> Self {
        for (from, to) in redirects {
            self.pairs.insert(from.clone(), to.clone());
        }
        self
    }

    /// Expand every pair for the given locales.
    #[must_use]
    pub fn build(self, locales: &[String]) -> RedirectTable {
        let mut table = RedirectTable::default();
        for (from, to) in self.pairs.pairs {
            for entry in expand(&from, &to, locales) {
                table.insert(entry);
            }
        }
        tracing::debug!(count = table.len(), "Redirect table built");
        table
    }
}

/// One locale-less entry followed by one entry per locale.
fn expand(from: &str, to: &str, locales: &[String]) -> Vec<RedirectEntry> {
    let mut entries = Vec::with_capacity(locales.len() + 1);
    entries.push(RedirectEntry::new(from.to_owned(), to.to_owned()));
    for locale in locales {
        let localized_to = if is_absolute(to) {
            to.to_owned()
        } else {
            locale_prefixed(locale, to)
        };
        entries.push(RedirectEntry::new(locale_prefixed(locale, from), localized_to));
    }
    entries
}

fn locale_prefixed(locale: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("/{locale}{path}")
    } else {
        format!("/{locale}/{path}")
    }
}

/// Whether `target` is an absolute or protocol-relative URL.
fn is_absolute(target: &str) -> bool {
    target.starts_with("//") || target.starts_with("http://") || target.starts_with("https://")
}

/// Legacy `.html` form of a path: `/api/v9/fs/` becomes `/api/v9/fs.html`.
fn html_variant(path: &str) -> String {
    format!("{}.html", path.trim_end_matches('/'))
}

/// Load the static redirect map (`{ "/old/": "/new/" }`).
///
/// A missing file is an empty map. Pairs are returned sorted by source path.
pub fn load_static_map(path: &Path) -> Result<Vec<(String, String)>, SiteError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No static redirect map");
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
    parse_static_map(&content).map_err(|message| SiteError::RedirectMap {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_static_map(content: &str) -> Result<Vec<(String, String)>, String> {
    let map: std::collections::BTreeMap<String, String> =
        serde_json::from_str(content).map_err(|e| e.to_string())?;
    Ok(map.into_iter().collect())
}

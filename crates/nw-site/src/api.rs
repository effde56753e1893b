//! API documentation versions.

use nw_content::{Category, ContentRecord};
use nw_data::compare_versions;

use crate::navigation::{
    Matching, NavigationDescriptor, NavigationError, NavigationTree, build_navigation,
};

/// API records grouped by frontmatter version.
#[derive(Debug, Default)]
pub struct ApiCatalog<'a> {
    /// Versions in ascending order, each with its records in input order.
    versions: Vec<(String, Vec<&'a ContentRecord>)>,
}

impl<'a> ApiCatalog<'a> {
    /// Group API records by version.
    ///
    /// Records without a version are left out of the catalog.
    #[must_use]
    pub fn new(records: &'a [ContentRecord]) -> Self {
        let mut versions: Vec<(String, Vec<&'a ContentRecord>)> = Vec::new();
        for record in records.iter().filter(|r| r.category == Category::Api) {
            let Some(version) = record.version().filter(|v| !v.is_empty()) else {
                tracing::debug!(path = %record.relative_path, "API page without version");
                continue;
            };
            match versions.iter_mut().find(|(v, _)| v == version) {
                Some((_, group)) => group.push(record),
                None => versions.push((version.to_owned(), vec![record])),
            }
        }
        versions.sort_by(|(a, _), (b, _)| compare_versions(a, b));
        Self { versions }
    }

    /// Records of `version`.
    #[must_use]
    pub fn records(&self, version: &str) -> &[&'a ContentRecord] {
        self.versions
            .iter()
            .find(|(v, _)| v == version)
            .map_or(&[][..], |(_, records)| records.as_slice())
    }

    /// Latest version.
    #[must_use]
    pub fn latest(&self) -> Option<&str> {
        self.versions.last().map(|(v, _)| v.as_str())
    }

    /// One navigation tree per version, in ascending version order.
    ///
    /// # Errors
    ///
    /// Propagates [`NavigationError`] from strict matching.
    pub fn navigation(
        &self,
        descriptor: &NavigationDescriptor,
        matching: Matching,
    ) -> Result<Vec<(String, NavigationTree)>, NavigationError> {
        self.versions
            .iter()
            .map(|(version, records)| {
                build_navigation(descriptor, records, matching).map(|tree| (version.clone(), tree))
            })
            .collect()
    }

    /// Redirects from older version pages to their latest equivalents.
    ///
    /// A page is equivalent when its path after the version segment also
    /// exists under the latest version. Pairs are ordered by version, then
    /// by record order.
    #[must_use]
    pub fn default_redirects(&self, api_root: &str) -> Vec<(String, String)> {
        let Some(latest) = self.latest() else {
            return Vec::new();
        };

        let latest_pages: Vec<(&str, &str)> = self
            .records(latest)
            .iter()
            .filter_map(|r| version_tail(r.slug(), api_root, latest).map(|tail| (tail, r.slug())))
            .collect();

        let mut redirects = Vec::new();
        for (version, records) in &self.versions {
            if version == latest {
                continue;
            }
            for record in records {
                let Some(tail) = version_tail(record.slug(), api_root, version) else {
                    continue;
                };
                if let Some((_, target)) = latest_pages.iter().find(|(t, _)| *t == tail) {
                    redirects.push((record.slug().to_owned(), (*target).to_owned()));
                }
            }
        }
        redirects
    }
}

/// Part of `slug` after `<api_root>/<version>/`.
fn version_tail<'s>(slug: &'s str, api_root: &str, version: &str) -> Option<&'s str> {
    slug.strip_prefix(api_root.trim_end_matches('/'))?
        .strip_prefix('/')?
        .strip_prefix(version)?
        .strip_prefix('/')
}

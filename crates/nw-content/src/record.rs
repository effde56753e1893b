//! Content records produced by ingestion.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::frontmatter::Frontmatter;
use crate::reading_time::ReadingTime;

/// Classification of a content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Dated post under the blog content root.
    Blog,
    /// Learn section page (frontmatter `category: learn`).
    Learn,
    /// API documentation page (frontmatter `category: api`).
    Api,
    /// Any other page.
    None,
}

/// Fields attached to a record during ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFields {
    /// Canonical URL path. Never empty.
    pub slug: String,
    /// Publication date parsed from a blog filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Reading-time estimate (blog posts only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<ReadingTime>,
    /// Authors split from the frontmatter list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    /// Frontmatter category, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// A content file after ingestion.
#[derive(Debug, Clone)]
pub struct ContentRecord {
    /// Absolute path of the source file.
    pub file_path: PathBuf,
    /// Path relative to the content directory, `/`-separated.
    pub relative_path: String,
    /// Classification.
    pub category: Category,
    /// Parsed frontmatter.
    pub frontmatter: Frontmatter,
    /// Resolved title.
    pub title: String,
    /// Body after the frontmatter block.
    pub raw_body: String,
    /// Fields derived during ingestion.
    pub fields: DerivedFields,
}

impl ContentRecord {
    /// Stable key used to match navigation descriptor items.
    ///
    /// The frontmatter `key` when present, else the file stem.
    #[must_use]
    pub fn key(&self) -> &str {
        if let Some(key) = self.frontmatter.key.as_deref() {
            return key;
        }
        self.file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    /// Canonical URL path.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.fields.slug
    }

    /// Frontmatter version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.frontmatter.version.as_deref()
    }
}

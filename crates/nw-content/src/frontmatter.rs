//! Frontmatter extraction and YAML parsing.
//!
//! A content file may open with a YAML block fenced by `---` lines. The
//! closing fence may also be `...`. Everything after the closing fence is the
//! raw body.

use serde::{Deserialize, Serialize};

/// Structured metadata from the top of a content document.
///
/// All fields are optional; absent fields are not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// API documentation version (e.g. `v18`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Comma-separated author handles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    /// Content category (`learn`, `api`) or, for blog posts, the blog category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Stable key used by navigation descriptors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Split a document into its frontmatter YAML and raw body.
///
/// Returns `(None, source)` when the document has no complete frontmatter block.
pub(crate) fn split_frontmatter(source: &str) -> (Option<&str>, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(rest) = source.strip_prefix("---") else {
        return (None, source);
    };
    let Some(rest) = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let fence = line.trim_end_matches(['\r', '\n']);
        if fence == "---" || fence == "..." {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }

    (None, source)
}

/// Parse frontmatter YAML.
///
/// Empty content yields a default instance.
pub(crate) fn parse_frontmatter(yaml: &str) -> Result<Frontmatter, serde_yaml::Error> {
    let trimmed = yaml.trim();
    if trimmed.is_empty() {
        return Ok(Frontmatter::default());
    }
    serde_yaml::from_str(trimmed)
}

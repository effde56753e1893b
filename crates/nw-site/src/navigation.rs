//! Navigation trees built from YAML descriptors.
//!
//! A descriptor is an ordered mapping of section keys. Each section is
//! either a list of items or `{ category, items }`:
//!
//! ```yaml
//! getting-started:
//!   - key: introduction-to-nodejs
//!   - title: How to install Node.js
//!     children:
//!       - npm
//! quick-start:
//!   category: basics
//!   items: [a-first-app]
//! ```
//!
//! Items match content records by `key` (frontmatter `key`, else the file
//! stem) or, without a key, by exact title. A bare string item is a key.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use nw_content::ContentRecord;

/// Error building navigation.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// The descriptor file could not be read.
    #[error("Failed to read navigation descriptor {}: {source}", path.display())]
    Io {
        /// Descriptor path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The descriptor is not valid YAML or does not follow the schema.
    #[error("Invalid navigation descriptor: {0}")]
    Parse(String),
    /// A descriptor item matches no content record (strict mode).
    #[error("Navigation item '{item}' in section '{section}' matches no content")]
    UnmatchedItem {
        /// Section key.
        section: String,
        /// Item key or title.
        item: String,
    },
}

/// How unmatched descriptor items are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Matching {
    /// Drop the item and log a warning.
    #[default]
    Lenient,
    /// Fail with [`NavigationError::UnmatchedItem`].
    Strict,
}

impl Matching {
    /// Strict when `strict` is set.
    #[must_use]
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawItem {
    Key(String),
    Full {
        key: Option<String>,
        title: Option<String>,
        category: Option<String>,
        #[serde(default)]
        children: Vec<RawItem>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawSection {
    Items(Vec<RawItem>),
    Grouped {
        category: Option<String>,
        #[serde(default)]
        items: Vec<RawItem>,
    },
}

/// Item of a navigation descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorItem {
    /// Stable key to match.
    pub key: Option<String>,
    /// Exact title to match when no key is given.
    pub title: Option<String>,
    /// Category used when the matched record has none.
    pub category: Option<String>,
    /// Nested items.
    pub children: Vec<DescriptorItem>,
}

impl DescriptorItem {
    fn label(&self) -> &str {
        self.key
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("<unnamed>")
    }
}

impl From<RawItem> for DescriptorItem {
    fn from(raw: RawItem) -> Self {
        match raw {
            RawItem::Key(key) => Self {
                key: Some(key),
                title: None,
                category: None,
                children: Vec::new(),
            },
            RawItem::Full {
                key,
                title,
                category,
                children,
            } => Self {
                key,
                title,
                category,
                children: children.into_iter().map(Self::from).collect(),
            },
        }
    }
}

/// Section of a navigation descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSection {
    /// Section key.
    pub key: String,
    /// Section category; defaults to the key.
    pub category: String,
    /// Items in display order.
    pub items: Vec<DescriptorItem>,
}

/// Parsed navigation descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationDescriptor {
    /// Sections in display order.
    pub sections: Vec<DescriptorSection>,
}

impl NavigationDescriptor {
    /// Parse a YAML descriptor. An empty document has no sections.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::Parse`] for invalid YAML or schema.
    pub fn parse(yaml: &str) -> Result<Self, NavigationError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let mapping: serde_yaml::Mapping =
            serde_yaml::from_str(yaml).map_err(|e| NavigationError::Parse(e.to_string()))?;

        let mut sections = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Some(key) = key.as_str().map(str::to_owned) else {
                return Err(NavigationError::Parse(format!(
                    "section keys must be strings, found {key:?}"
                )));
            };
            let raw: RawSection = serde_yaml::from_value(value)
                .map_err(|e| NavigationError::Parse(format!("section '{key}': {e}")))?;
            let (category, items) = match raw {
                RawSection::Items(items) => (None, items),
                RawSection::Grouped { category, items } => (category, items),
            };
            sections.push(DescriptorSection {
                category: category.unwrap_or_else(|| key.clone()),
                key,
                items: items.into_iter().map(DescriptorItem::from).collect(),
            });
        }

        Ok(Self { sections })
    }

    /// Load a descriptor file. A missing file has no sections.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::Io`] if the file exists but cannot be read,
    /// or [`NavigationError::Parse`] if it is invalid.
    pub fn load(path: &Path) -> Result<Self, NavigationError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No navigation descriptor");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| NavigationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }
}

/// Entry of a navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// Target slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Record category name, item category or section category.
    pub category: String,
    /// Nested entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavEntry>,
}

/// Section of a navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavSection {
    /// Section key.
    #[serde(skip)]
    pub key: String,
    /// Entries in display order.
    pub data: Vec<NavEntry>,
    /// Section category.
    pub category: String,
}

/// Ordered navigation tree.
///
/// Serializes as a mapping of section key to `{ data, category }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationTree {
    sections: Vec<NavSection>,
}

impl NavigationTree {
    /// Sections in display order.
    #[must_use]
    pub fn sections(&self) -> &[NavSection] {
        &self.sections
    }

    /// Section by key.
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&NavSection> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Whether the tree has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.data.is_empty())
    }

    /// All entries in reading order: sections in order, parents before
    /// their children.
    #[must_use]
    pub fn entries(&self) -> Vec<&NavEntry> {
        fn walk<'a>(entries: &'a [NavEntry], out: &mut Vec<&'a NavEntry>) {
            for entry in entries {
                out.push(entry);
                walk(&entry.children, out);
            }
        }
        let mut out = Vec::new();
        for section in &self.sections {
            walk(&section.data, &mut out);
        }
        out
    }
}

impl Serialize for NavigationTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.key, section)?;
        }
        map.end()
    }
}

struct RecordIndex<'a> {
    by_key: HashMap<&'a str, &'a ContentRecord>,
    by_title: HashMap<&'a str, &'a ContentRecord>,
}

impl<'a> RecordIndex<'a> {
    fn new(records: &[&'a ContentRecord]) -> Self {
        let mut by_key = HashMap::new();
        let mut by_title = HashMap::new();
        for &record in records {
            if let Some(existing) = by_key.insert(record.key(), record) {
                tracing::debug!(
                    key = record.key(),
                    first = %existing.relative_path,
                    second = %record.relative_path,
                    "Duplicate navigation key, later record wins"
                );
            }
            if let Some(existing) = by_title.insert(record.title.as_str(), record) {
                tracing::debug!(
                    title = %record.title,
                    first = %existing.relative_path,
                    second = %record.relative_path,
                    "Duplicate navigation title, later record wins"
                );
            }
        }
        Self { by_key, by_title }
    }

    fn find(&self, item: &DescriptorItem) -> Option<&'a ContentRecord> {
        match (&item.key, &item.title) {
            (Some(key), _) => self.by_key.get(key.as_str()).copied(),
            (None, Some(title)) => self.by_title.get(title.as_str()).copied(),
            (None, None) => None,
        }
    }
}

/// Build a navigation tree by matching descriptor items to records.
///
/// # Errors
///
/// Returns [`NavigationError::UnmatchedItem`] in [`Matching::Strict`] mode
/// when an item matches no record.
pub fn build_navigation(
    descriptor: &NavigationDescriptor,
    records: &[&ContentRecord],
    matching: Matching,
) -> Result<NavigationTree, NavigationError> {
    let index = RecordIndex::new(records);

    let sections = descriptor
        .sections
        .iter()
        .map(|section| {
            let data = build_entries(&section.items, section, &index, matching)?;
            Ok(NavSection {
                key: section.key.clone(),
                data,
                category: section.category.clone(),
            })
        })
        .collect::<Result<Vec<_>, NavigationError>>()?;

    Ok(NavigationTree { sections })
}

fn build_entries(
    items: &[DescriptorItem],
    section: &DescriptorSection,
    index: &RecordIndex<'_>,
    matching: Matching,
) -> Result<Vec<NavEntry>, NavigationError> {
    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let Some(record) = index.find(item) else {
            match matching {
                Matching::Strict => {
                    return Err(NavigationError::UnmatchedItem {
                        section: section.key.clone(),
                        item: item.label().to_owned(),
                    });
                }
                Matching::Lenient => {
                    tracing::warn!(
                        section = %section.key,
                        item = item.label(),
                        "Navigation item matches no content, dropping"
                    );
                    continue;
                }
            }
        };

        let category = record
            .fields
            .category_name
            .clone()
            .or_else(|| item.category.clone())
            .unwrap_or_else(|| section.category.clone());

        entries.push(NavEntry {
            slug: record.fields.slug.clone(),
            title: record.title.clone(),
            category,
            children: build_entries(&item.children, section, index, matching)?,
        });
    }
    Ok(entries)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use nw_content::{Category, DerivedFields, Frontmatter};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    pub(crate) fn record(stem: &str, title: &str, slug: &str, category: Option<&str>) -> ContentRecord {
        ContentRecord {
            file_path: PathBuf::from(format!("/site/content/{stem}.md")),
            relative_path: format!("{stem}.md"),
            category: Category::Learn,
            frontmatter: Frontmatter {
                title: Some(title.to_owned()),
                category: category.map(str::to_owned),
                ..Frontmatter::default()
            },
            title: title.to_owned(),
            raw_body: String::new(),
            fields: DerivedFields {
                slug: slug.to_owned(),
                date: None,
                reading_time: None,
                authors: None,
                category_name: category.map(str::to_owned),
            },
        }
    }

    fn learn_records() -> Vec<ContentRecord> {
        vec![
            record("intro", "Introduction to Node.js", "/learn/introduction-to-nodejs/", None),
            record("install", "How to install Node.js", "/learn/how-to-install-nodejs/", None),
            record("npm", "An introduction to npm", "/learn/an-introduction-to-npm/", Some("learn")),
        ]
    }

    #[test]
    fn test_parse_both_section_forms() {
        let descriptor = NavigationDescriptor::parse(
            r"
getting-started:
  - intro
  - title: How to install Node.js
    category: setup
quick-start:
  category: basics
  items:
    - key: npm
",
        )
        .unwrap();

        assert_eq!(descriptor.sections.len(), 2);
        assert_eq!(descriptor.sections[0].key, "getting-started");
        assert_eq!(descriptor.sections[0].category, "getting-started");
        assert_eq!(descriptor.sections[0].items[0].key.as_deref(), Some("intro"));
        assert_eq!(
            descriptor.sections[0].items[1].title.as_deref(),
            Some("How to install Node.js")
        );
        assert_eq!(descriptor.sections[1].category, "basics");
    }

    #[test]
    fn test_parse_preserves_section_order() {
        let descriptor = NavigationDescriptor::parse("zeta: []\nalpha: []\nmid: []\n").unwrap();
        let keys: Vec<_> = descriptor.sections.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_invalid_descriptor() {
        assert!(matches!(
            NavigationDescriptor::parse("- just\n- a list\n"),
            Err(NavigationError::Parse(_))
        ));
        assert!(matches!(
            NavigationDescriptor::parse("section: 42\n"),
            Err(NavigationError::Parse(_))
        ));
    }

    #[test]
    fn test_build_matches_by_key_and_title() {
        let records = learn_records();
        let refs: Vec<_> = records.iter().collect();
        let descriptor = NavigationDescriptor::parse(
            r"
getting-started:
  - intro
  - title: How to install Node.js
    category: setup
    children:
      - npm
",
        )
        .unwrap();

        let tree = build_navigation(&descriptor, &refs, Matching::Lenient).unwrap();

        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({
                "getting-started": {
                    "category": "getting-started",
                    "data": [
                        {
                            "slug": "/learn/introduction-to-nodejs/",
                            "title": "Introduction to Node.js",
                            "category": "getting-started"
                        },
                        {
                            "slug": "/learn/how-to-install-nodejs/",
                            "title": "How to install Node.js",
                            "category": "setup",
                            "children": [{
                                "slug": "/learn/an-introduction-to-npm/",
                                "title": "An introduction to npm",
                                "category": "learn"
                            }]
                        }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_entries_in_reading_order() {
        let records = learn_records();
        let refs: Vec<_> = records.iter().collect();
        let descriptor = NavigationDescriptor::parse(
            "a:\n  - key: install\n    children: [npm]\nb:\n  - intro\n",
        )
        .unwrap();

        let tree = build_navigation(&descriptor, &refs, Matching::Lenient).unwrap();
        let slugs: Vec<_> = tree.entries().iter().map(|e| e.slug.as_str()).collect();

        assert_eq!(
            slugs,
            vec![
                "/learn/how-to-install-nodejs/",
                "/learn/an-introduction-to-npm/",
                "/learn/introduction-to-nodejs/",
            ]
        );
    }

    #[test]
    fn test_unmatched_item_dropped_in_lenient_mode() {
        let records = learn_records();
        let refs: Vec<_> = records.iter().collect();
        let descriptor = NavigationDescriptor::parse("s:\n  - missing\n  - intro\n").unwrap();

        let tree = build_navigation(&descriptor, &refs, Matching::Lenient).unwrap();

        assert_eq!(tree.entries().len(), 1);
        assert_eq!(tree.section("s").unwrap().data[0].title, "Introduction to Node.js");
    }

    #[test]
    fn test_unmatched_item_fails_in_strict_mode() {
        let records = learn_records();
        let refs: Vec<_> = records.iter().collect();
        let descriptor = NavigationDescriptor::parse("s:\n  - title: Nope\n").unwrap();

        let err = build_navigation(&descriptor, &refs, Matching::Strict).unwrap_err();

        assert!(matches!(
            err,
            NavigationError::UnmatchedItem { ref section, ref item } if section == "s" && item == "Nope"
        ));
    }

    #[test]
    fn test_title_match_is_exact() {
        let records = learn_records();
        let refs: Vec<_> = records.iter().collect();
        let descriptor =
            NavigationDescriptor::parse("s:\n  - title: introduction to node.js\n").unwrap();

        let tree = build_navigation(&descriptor, &refs, Matching::Lenient).unwrap();

        assert!(tree.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let descriptor = NavigationDescriptor::load(Path::new("/nonexistent/learn.yaml")).unwrap();
        assert!(descriptor.sections.is_empty());
    }

    #[test]
    fn test_duplicate_records_later_wins_for_key_and_title() {
        let records = vec![
            record("intro", "Introduction", "/learn/first/", None),
            record("intro", "Introduction", "/learn/second/", None),
        ];
        let refs: Vec<_> = records.iter().collect();
        let descriptor =
            NavigationDescriptor::parse("by-key:\n  - intro\nby-title:\n  - title: Introduction\n")
                .unwrap();

        let tree = build_navigation(&descriptor, &refs, Matching::Strict).unwrap();

        let slugs: Vec<_> = tree.entries().iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["/learn/second/", "/learn/second/"]);
    }
}

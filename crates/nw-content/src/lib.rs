//! Content ingestion for the nodeweb site builder.
//!
//! This crate turns a directory of Markdown/MDX files into [`ContentRecord`]s:
//!
//! - Recursive discovery of `.md` and `.mdx` files
//! - YAML frontmatter parsing
//! - Slug derivation for blog, learn, API and general pages
//! - Reading-time estimates for blog posts
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use nw_content::{ContentLoader, SlugDeriver, SlugRoots};
//!
//! let deriver = SlugDeriver::new(PathBuf::from("content/blog"), SlugRoots::default());
//! let records = ContentLoader::new(PathBuf::from("content"), deriver).load()?;
//! for record in &records {
//!     println!("{} -> {}", record.relative_path, record.slug());
//! }
//! ```

mod error;
mod frontmatter;
mod reading_time;
mod record;
mod scanner;
mod slug;

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

pub use error::ContentError;
pub use frontmatter::Frontmatter;
pub use reading_time::{ReadingTime, estimate as estimate_reading_time};
pub use record::{Category, ContentRecord, DerivedFields};
pub use slug::{SlugDeriver, SlugInput, SlugRoots, slugify};

use frontmatter::{parse_frontmatter, split_frontmatter};
use scanner::ContentRef;

/// Loads every content file under a directory.
#[derive(Debug, Clone)]
pub struct ContentLoader {
    content_dir: PathBuf,
    deriver: SlugDeriver,
}

impl ContentLoader {
    /// Create a loader for `content_dir`.
    #[must_use]
    pub fn new(content_dir: PathBuf, deriver: SlugDeriver) -> Self {
        Self {
            content_dir,
            deriver,
        }
    }

    /// Discover, parse and derive every content file.
    ///
    /// Files are parsed in parallel. Records are returned sorted by relative
    /// path.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContentError`] encountered. No records are
    /// returned when any file fails.
    pub fn load(&self) -> Result<Vec<ContentRecord>, ContentError> {
        let refs = scanner::scan(&self.content_dir)?;
        tracing::debug!(
            dir = %self.content_dir.display(),
            file_count = refs.len(),
            "Content scan completed"
        );

        let records = refs
            .par_iter()
            .map(|content_ref| self.load_one(content_ref))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(record_count = records.len(), "Content loaded");
        Ok(records)
    }

    fn load_one(&self, content_ref: &ContentRef) -> Result<ContentRecord, ContentError> {
        let path = &content_ref.file_path;
        let source = fs::read_to_string(path).map_err(|e| ContentError::io(path, e))?;

        let (yaml, body) = split_frontmatter(&source);
        let frontmatter = match yaml {
            Some(yaml) => parse_frontmatter(yaml).map_err(|e| ContentError::Frontmatter {
                path: path.clone(),
                message: e.to_string(),
            })?,
            None => Frontmatter::default(),
        };

        let title = frontmatter
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_stem(path));

        let fields = self.deriver.derive(&SlugInput {
            file_path: path,
            frontmatter: &frontmatter,
            title: &title,
            raw_body: body,
        })?;

        Ok(ContentRecord {
            file_path: path.clone(),
            relative_path: content_ref.relative_path.clone(),
            category: self.deriver.classify(path, &frontmatter),
            raw_body: body.to_owned(),
            frontmatter,
            title,
            fields,
        })
    }
}

/// Title-case a file stem: `getting-started` becomes `Getting Started`.
fn title_from_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    stem.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn loader(dir: &Path) -> ContentLoader {
        let deriver = SlugDeriver::new(dir.join("blog"), SlugRoots::default());
        ContentLoader::new(dir.to_path_buf(), deriver)
    }

    #[test]
    fn test_load_blog_post_with_category() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "blog/2022-11-11-example.md",
            "---\ntitle: Example\ncategory: news\nauthors: Alice, Bob\n---\nHello world\n",
        );

        let records = loader(dir.path()).load().unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.category, Category::Blog);
        assert_eq!(record.slug(), "/blog/news/2022/11/11/example");
        assert_eq!(record.fields.date, NaiveDate::from_ymd_opt(2022, 11, 11));
        assert_eq!(
            record.fields.authors,
            Some(vec!["Alice".to_owned(), "Bob".to_owned()])
        );
        assert_eq!(record.fields.category_name.as_deref(), Some("news"));
        assert_eq!(record.raw_body, "Hello world\n");
        assert_eq!(record.relative_path, "blog/2022-11-11-example.md");
    }

    #[test]
    fn test_load_learn_and_general_pages() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "learn/intro.md",
            "---\ntitle: Introduction to Node.js\ncategory: learn\n---\nBody",
        );
        write(dir.path(), "pages/about-us.md", "No frontmatter here");

        let records = loader(dir.path()).load().unwrap();
        let slugs: Vec<_> = records.iter().map(ContentRecord::slug).collect();

        assert_eq!(slugs, vec!["/learn/introduction-to-nodejs/", "about-us"]);
        assert_eq!(records[0].category, Category::Learn);
        assert_eq!(records[1].title, "About Us");
        assert_eq!(records[1].category, Category::None);
    }

    #[test]
    fn test_load_api_page() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "api/v18/fs.md",
            "---\ntitle: fs\ncategory: api\nversion: v18\n---\n",
        );

        let records = loader(dir.path()).load().unwrap();

        assert_eq!(records[0].slug(), "/api/v18/fs/");
        assert_eq!(records[0].version(), Some("v18"));
    }

    #[test]
    fn test_load_malformed_blog_filename_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "blog/example.md", "---\ntitle: Example\n---\n");
        write(dir.path(), "about.md", "About");

        let result = loader(dir.path()).load();

        assert!(matches!(
            result,
            Err(ContentError::MalformedBlogFilename { .. })
        ));
    }

    #[test]
    fn test_load_invalid_frontmatter_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "broken.md", "---\ntitle: [unclosed\n---\nBody");

        let result = loader(dir.path()).load();

        assert!(matches!(result, Err(ContentError::Frontmatter { .. })));
    }

    #[test]
    fn test_every_record_has_non_empty_slug() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "symbols.md", "---\ntitle: \"!!!\"\n---\n");
        write(dir.path(), "blank-title.md", "---\ntitle: \"  \"\n---\n");

        let records = loader(dir.path()).load().unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.slug().is_empty()));
        assert_eq!(records[0].slug(), "blank-title");
        assert_eq!(records[1].slug(), "symbols");
    }

    #[test]
    fn test_title_from_stem() {
        assert_eq!(
            title_from_stem(Path::new("/c/getting-started_guide.md")),
            "Getting Started Guide"
        );
    }
}

//! URL slug derivation for content records.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. Files under the blog root: `<blog>/[<category>/]<YYYY>/<MM>/<DD>/<name>`,
//!    parsed from a `YYYY-MM-DD-<name>.md` filename.
//! 2. Frontmatter category `learn`: `<learn>/<slugify(title)>/`.
//! 3. Frontmatter category `api`: `<api>/<version>/<title>/`.
//! 4. Anything else: `slugify(title)`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ContentError;
use crate::frontmatter::Frontmatter;
use crate::reading_time;
use crate::record::{Category, DerivedFields};

static BLOG_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(.+)\.mdx?$").expect("invalid blog filename regex")
});

/// URL roots used when building slugs.
///
/// Roots start with `/` and carry no trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugRoots {
    /// Blog URL root (e.g. `/blog`).
    pub blog: String,
    /// Learn URL root (e.g. `/learn`).
    pub learn: String,
    /// API URL root (e.g. `/api`).
    pub api: String,
}

impl Default for SlugRoots {
    fn default() -> Self {
        Self {
            blog: "/blog".to_owned(),
            learn: "/learn".to_owned(),
            api: "/api".to_owned(),
        }
    }
}

/// Content file as seen by the slug deriver.
#[derive(Debug)]
pub struct SlugInput<'a> {
    /// Absolute file path.
    pub file_path: &'a Path,
    /// Parsed frontmatter.
    pub frontmatter: &'a Frontmatter,
    /// Resolved title (frontmatter title or file stem).
    pub title: &'a str,
    /// Raw body after the frontmatter block.
    pub raw_body: &'a str,
}

/// Derives slugs and per-record fields during content ingestion.
#[derive(Debug, Clone)]
pub struct SlugDeriver {
    blog_dir: PathBuf,
    roots: SlugRoots,
}

impl SlugDeriver {
    /// Create a deriver for the given blog content root and URL roots.
    #[must_use]
    pub fn new(blog_dir: PathBuf, roots: SlugRoots) -> Self {
        Self { blog_dir, roots }
    }

    /// Classify a content file.
    #[must_use]
    pub fn classify(&self, file_path: &Path, frontmatter: &Frontmatter) -> Category {
        if file_path.starts_with(&self.blog_dir) {
            return Category::Blog;
        }
        match frontmatter.category.as_deref() {
            Some("learn") => Category::Learn,
            Some("api") => Category::Api,
            _ => Category::None,
        }
    }

    /// Derive the slug and the fields attached during ingestion.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::MalformedBlogFilename`] for a file under the
    /// blog root whose name is not `YYYY-MM-DD-<name>.md` or whose date is
    /// not a calendar date.
    pub fn derive(&self, input: &SlugInput<'_>) -> Result<DerivedFields, ContentError> {
        let frontmatter = input.frontmatter;
        let mut fields = DerivedFields {
            slug: String::new(),
            date: None,
            reading_time: None,
            authors: frontmatter.authors.as_deref().map(split_authors),
            category_name: frontmatter.category.clone(),
        };

        match self.classify(input.file_path, frontmatter) {
            Category::Blog => {
                let post = parse_blog_filename(input.file_path)?;
                fields.slug = self.blog_slug(&post, frontmatter.category.as_deref());
                fields.date = Some(post.date);
                fields.reading_time = Some(reading_time::estimate(input.raw_body));
            }
            Category::Learn => {
                let segment = non_empty_slug(input.title, input.file_path);
                fields.slug = route(&self.roots.learn, &[segment.as_str()], true);
            }
            Category::Api => {
                let version = frontmatter.version.as_deref().unwrap_or_default();
                fields.slug = route(&self.roots.api, &[version, input.title], true);
            }
            Category::None => {
                fields.slug = non_empty_slug(input.title, input.file_path);
            }
        }

        Ok(fields)
    }

    fn blog_slug(&self, post: &BlogFilename, category: Option<&str>) -> String {
        let mut segments = Vec::with_capacity(5);
        if let Some(category) = category {
            segments.push(category);
        }
        segments.extend([
            post.year.as_str(),
            post.month.as_str(),
            post.day.as_str(),
            post.name.as_str(),
        ]);
        route(&self.roots.blog, &segments, false)
    }
}

/// Date and name parsed from a blog filename.
#[derive(Debug)]
struct BlogFilename {
    year: String,
    month: String,
    day: String,
    name: String,
    date: NaiveDate,
}

fn parse_blog_filename(file_path: &Path) -> Result<BlogFilename, ContentError> {
    let malformed = || ContentError::MalformedBlogFilename {
        path: file_path.to_path_buf(),
    };

    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(malformed)?;
    let caps = BLOG_FILENAME.captures(file_name).ok_or_else(malformed)?;

    let year = caps[1].to_owned();
    let month = caps[2].to_owned();
    let day = caps[3].to_owned();
    let name = caps[4].to_owned();

    let date = NaiveDate::from_ymd_opt(
        year.parse().map_err(|_| malformed())?,
        month.parse().map_err(|_| malformed())?,
        day.parse().map_err(|_| malformed())?,
    )
    .ok_or_else(malformed)?;

    Ok(BlogFilename {
        year,
        month,
        day,
        name,
        date,
    })
}

/// Split a comma-separated author list.
fn split_authors(authors: &str) -> Vec<String> {
    authors
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Slugify a title, falling back to the file stem so the slug is never empty.
fn non_empty_slug(title: &str, file_path: &Path) -> String {
    let slug = slugify(title);
    if !slug.is_empty() {
        return slug;
    }
    let stem = file_path
        .file_stem()
        .map(|s| slugify(&s.to_string_lossy()))
        .unwrap_or_default();
    if stem.is_empty() {
        "untitled".to_owned()
    } else {
        stem
    }
}

/// Join a URL root with path segments.
///
/// Empty segments are skipped. A root of `/` does not produce a double slash.
fn route(root: &str, segments: &[&str], trailing_slash: bool) -> String {
    let mut path = root.trim_end_matches('/').to_owned();
    for segment in segments.iter().filter(|s| !s.is_empty()) {
        path.push('/');
        path.push_str(segment);
    }
    if trailing_slash || path.is_empty() {
        path.push('/');
    }
    path
}

/// Convert text to a URL slug.
///
/// ASCII alphanumerics are lowercased and kept; whitespace, `-` and `_`
/// collapse into a single `-`; everything else is dropped.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn deriver() -> SlugDeriver {
        SlugDeriver::new(PathBuf::from("/site/content/blog"), SlugRoots::default())
    }

    fn derive(path: &str, frontmatter: &Frontmatter, title: &str) -> Result<DerivedFields, ContentError> {
        deriver().derive(&SlugInput {
            file_path: Path::new(path),
            frontmatter,
            title,
            raw_body: "Some body text for the post.",
        })
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Introduction to Node.js"), "introduction-to-nodejs");
        assert_eq!(slugify("  How to use the  REPL "), "how-to-use-the-repl");
        assert_eq!(slugify("snake_case and-dash"), "snake-case-and-dash");
        assert_eq!(slugify("ES6 / ES2015 & beyond!"), "es6-es2015-beyond");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_blog_slug_with_category() {
        let fm = Frontmatter {
            category: Some("news".to_owned()),
            ..Default::default()
        };
        let fields = derive("/site/content/blog/2022-11-11-example.md", &fm, "Example").unwrap();
        assert_eq!(fields.slug, "/blog/news/2022/11/11/example");
        assert_eq!(fields.date, NaiveDate::from_ymd_opt(2022, 11, 11));
        assert_eq!(fields.category_name.as_deref(), Some("news"));
        assert!(fields.reading_time.is_some());
    }

    #[test]
    fn test_blog_slug_without_category() {
        let fields = derive(
            "/site/content/blog/2021-02-03-hello-world.md",
            &Frontmatter::default(),
            "Hello",
        )
        .unwrap();
        assert_eq!(fields.slug, "/blog/2021/02/03/hello-world");
        assert!(fields.category_name.is_none());
    }

    #[test]
    fn test_blog_slug_in_subdirectory() {
        let fields = derive(
            "/site/content/blog/release/2020-04-21-node-v14.mdx",
            &Frontmatter::default(),
            "Node v14",
        )
        .unwrap();
        assert_eq!(fields.slug, "/blog/2020/04/21/node-v14");
    }

    #[test]
    fn test_blog_malformed_filename() {
        let err = derive(
            "/site/content/blog/hello-world.md",
            &Frontmatter::default(),
            "Hello",
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::MalformedBlogFilename { .. }));
    }

    #[test]
    fn test_blog_invalid_calendar_date() {
        let err = derive(
            "/site/content/blog/2022-13-40-impossible.md",
            &Frontmatter::default(),
            "Impossible",
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::MalformedBlogFilename { .. }));
    }

    #[test]
    fn test_learn_slug() {
        let fm = Frontmatter {
            category: Some("learn".to_owned()),
            ..Default::default()
        };
        let fields = derive(
            "/site/content/learn/intro.md",
            &fm,
            "Introduction to Node.js",
        )
        .unwrap();
        assert_eq!(fields.slug, "/learn/introduction-to-nodejs/");
        assert!(fields.date.is_none());
        assert!(fields.reading_time.is_none());
    }

    #[test]
    fn test_api_slug() {
        let fm = Frontmatter {
            category: Some("api".to_owned()),
            version: Some("v18".to_owned()),
            ..Default::default()
        };
        let fields = derive("/site/content/api/v18/fs.md", &fm, "fs").unwrap();
        assert_eq!(fields.slug, "/api/v18/fs/");
    }

    #[test]
    fn test_api_slug_without_version() {
        let fm = Frontmatter {
            category: Some("api".to_owned()),
            ..Default::default()
        };
        let fields = derive("/site/content/api/fs.md", &fm, "fs").unwrap();
        assert_eq!(fields.slug, "/api/fs/");
    }

    #[test]
    fn test_general_slug() {
        let fields = derive(
            "/site/content/about.md",
            &Frontmatter::default(),
            "About Node.js",
        )
        .unwrap();
        assert_eq!(fields.slug, "about-nodejs");
    }

    #[test]
    fn test_general_slug_falls_back_to_file_stem() {
        let fields = derive("/site/content/faq.md", &Frontmatter::default(), "???").unwrap();
        assert_eq!(fields.slug, "faq");
    }

    #[test]
    fn test_authors_split() {
        let fm = Frontmatter {
            authors: Some("alice, bob,,carol".to_owned()),
            ..Default::default()
        };
        let fields = derive("/site/content/about.md", &fm, "About").unwrap();
        assert_eq!(
            fields.authors,
            Some(vec!["alice".to_owned(), "bob".to_owned(), "carol".to_owned()])
        );
    }

    #[test]
    fn test_blog_category_takes_precedence_over_learn() {
        let fm = Frontmatter {
            category: Some("learn".to_owned()),
            ..Default::default()
        };
        let fields = derive("/site/content/blog/2022-01-01-tips.md", &fm, "Tips").unwrap();
        assert_eq!(fields.slug, "/blog/learn/2022/01/01/tips");
    }

    #[test]
    fn test_route_root_slash() {
        assert_eq!(route("/", &["faq"], true), "/faq/");
        assert_eq!(route("/api", &["", "fs"], true), "/api/fs/");
        assert_eq!(route("/", &[], false), "/");
    }
}

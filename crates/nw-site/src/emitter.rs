//! Page emission from content records.
//!
//! Every record becomes one page whose template follows its classification.
//! Blog category listings and the learn landing page are emitted after the
//! content pages, so they replace content pages registered at the same path.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value, json};

use nw_content::{Category, ContentRecord, SlugRoots};

use crate::error::SiteError;
use crate::navigation::{NavEntry, NavigationTree};
use crate::pages::{PageRecord, PageRegistry, Template, page_path};

/// Emits pages into a [`PageRegistry`].
pub struct PageEmitter<'a> {
    roots: &'a SlugRoots,
    learn_navigation: &'a NavigationTree,
    api_navigation: &'a [(String, NavigationTree)],
}

impl<'a> PageEmitter<'a> {
    /// Create an emitter over built navigation trees.
    #[must_use]
    pub fn new(
        roots: &'a SlugRoots,
        learn_navigation: &'a NavigationTree,
        api_navigation: &'a [(String, NavigationTree)],
    ) -> Self {
        Self {
            roots,
            learn_navigation,
            api_navigation,
        }
    }

    /// Template for a record.
    #[must_use]
    pub fn classify(&self, record: &ContentRecord) -> Template {
        if record.category == Category::Learn {
            Template::Learn
        } else if is_under(record.slug(), &self.roots.api) {
            Template::Api
        } else if is_under(record.slug(), &self.roots.blog) {
            Template::Blog
        } else {
            Template::General
        }
    }

    /// Register every page derived from `records`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::PageContext`] when a context value fails to
    /// serialize.
    pub fn emit(
        &self,
        records: &[ContentRecord],
        registry: &mut PageRegistry,
    ) -> Result<(), SiteError> {
        let blog_order = self.blog_order(records);
        let blog_position: HashMap<&str, usize> = blog_order
            .iter()
            .enumerate()
            .map(|(i, r)| (r.slug(), i))
            .collect();
        let learn_data = context_value(&self.roots.learn, self.learn_navigation)?;
        let learn_entries = self.learn_navigation.entries();

        for record in records {
            let template = self.classify(record);
            let mut context = base_context(record);

            match template {
                Template::Learn => {
                    context.insert("navigationData".to_owned(), learn_data.clone());
                    insert_neighbours(&mut context, &learn_entries, record.slug());
                }
                Template::Api => self.api_context(&mut context, record)?,
                Template::Blog => {
                    blog_context(&mut context, record)?;
                    if let Some(&i) = blog_position.get(record.slug()) {
                        let previous = i.checked_sub(1).map(|p| blog_order[p]);
                        let next = blog_order.get(i + 1).copied();
                        context.insert("previous".to_owned(), record_link(previous));
                        context.insert("next".to_owned(), record_link(next));
                    }
                }
                Template::BlogCategory | Template::General => {}
            }

            registry.register(PageRecord::new(record.slug(), template, context));
        }

        self.emit_blog_categories(&blog_order, registry);
        self.emit_learn_landing(registry);

        tracing::debug!(page_count = registry.len(), "Pages emitted");
        Ok(())
    }

    /// Blog records, newest first. Ties order by slug.
    fn blog_order<'r>(&self, records: &'r [ContentRecord]) -> Vec<&'r ContentRecord> {
        let mut posts: Vec<_> = records
            .iter()
            .filter(|r| self.classify(r) == Template::Blog)
            .collect();
        posts.sort_by(|a, b| {
            b.fields
                .date
                .cmp(&a.fields.date)
                .then_with(|| a.slug().cmp(b.slug()))
        });
        posts
    }

    fn api_context(
        &self,
        context: &mut Map<String, Value>,
        record: &ContentRecord,
    ) -> Result<(), SiteError> {
        let version = record.version().unwrap_or_default();
        context.insert("version".to_owned(), Value::String(version.to_owned()));

        let tree = self
            .api_navigation
            .iter()
            .find(|(v, _)| v == version)
            .map(|(_, tree)| tree);
        match tree {
            Some(tree) => {
                context.insert("navigationData".to_owned(), context_value(record.slug(), tree)?);
                insert_neighbours(context, &tree.entries(), record.slug());
            }
            None => {
                context.insert("navigationData".to_owned(), json!({}));
                context.insert("previous".to_owned(), Value::Null);
                context.insert("next".to_owned(), Value::Null);
            }
        }
        Ok(())
    }

    fn emit_blog_categories(&self, blog_order: &[&ContentRecord], registry: &mut PageRegistry) {
        let mut categories: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for post in blog_order {
            if let Some(category) = post.fields.category_name.as_deref() {
                categories.entry(category).or_default().push(post.slug());
            }
        }

        for (category, posts) in categories {
            let path = format!("{}/{category}/", self.roots.blog.trim_end_matches('/'));
            let context = json!({
                "slug": path,
                "title": category,
                "categoryName": category,
                "posts": posts,
            });
            registry.register(PageRecord::new(
                &path,
                Template::BlogCategory,
                into_map(context),
            ));
        }
    }

    fn emit_learn_landing(&self, registry: &mut PageRegistry) {
        let Some(first) = self.learn_navigation.entries().into_iter().next() else {
            return;
        };
        let Some(context) = registry.get(&page_path(&first.slug)).map(|p| p.context.clone()) else {
            tracing::debug!(slug = %first.slug, "First learn entry has no page, skipping landing");
            return;
        };
        let landing = format!("{}/", self.roots.learn.trim_end_matches('/'));
        registry.register(PageRecord::new(&landing, Template::Learn, context));
    }
}

/// Whether `slug` is `root` or lies below it.
fn is_under(slug: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return false;
    }
    slug.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn base_context(record: &ContentRecord) -> Map<String, Value> {
    into_map(json!({
        "slug": record.slug(),
        "title": record.title,
        "categoryName": record.fields.category_name,
    }))
}

fn blog_context(context: &mut Map<String, Value>, record: &ContentRecord) -> Result<(), SiteError> {
    let fields = &record.fields;
    let slug = record.slug();
    context.insert("date".to_owned(), context_value(slug, &fields.date)?);
    context.insert(
        "readingTime".to_owned(),
        context_value(slug, &fields.reading_time)?,
    );
    context.insert("authors".to_owned(), context_value(slug, &fields.authors)?);
    Ok(())
}

fn context_value<T: Serialize + ?Sized>(path: &str, value: &T) -> Result<Value, SiteError> {
    serde_json::to_value(value).map_err(|source| SiteError::PageContext {
        path: path.to_owned(),
        source,
    })
}

fn insert_neighbours(context: &mut Map<String, Value>, entries: &[&NavEntry], slug: &str) {
    let position = entries.iter().position(|e| e.slug == slug);
    let previous = position
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| entries.get(i));
    let next = position.and_then(|i| entries.get(i + 1));
    context.insert("previous".to_owned(), entry_link(previous.copied()));
    context.insert("next".to_owned(), entry_link(next.copied()));
}

fn entry_link(entry: Option<&NavEntry>) -> Value {
    entry.map_or(Value::Null, |e| json!({ "slug": e.slug, "title": e.title }))
}

fn record_link(record: Option<&ContentRecord>) -> Value {
    record.map_or(Value::Null, |r| json!({ "slug": r.slug(), "title": r.title }))
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::tests::record;
    use crate::navigation::{Matching, NavigationDescriptor, build_navigation};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn blog_post(name: &str, date: (i32, u32, u32), category: Option<&str>) -> ContentRecord {
        let (y, m, d) = date;
        let slug = match category {
            Some(c) => format!("/blog/{c}/{y:04}/{m:02}/{d:02}/{name}"),
            None => format!("/blog/{y:04}/{m:02}/{d:02}/{name}"),
        };
        let mut post = record(name, name, &slug, category);
        post.category = Category::Blog;
        post.fields.date = NaiveDate::from_ymd_opt(y, m, d);
        post.fields.authors = Some(vec!["alice".to_owned()]);
        post.fields.reading_time = Some(nw_content::estimate_reading_time("one two three"));
        post
    }

    fn learn_tree(records: &[ContentRecord]) -> NavigationTree {
        let refs: Vec<_> = records.iter().filter(|r| r.category == Category::Learn).collect();
        let descriptor = NavigationDescriptor::parse("start:\n  - intro\n  - install\n").unwrap();
        build_navigation(&descriptor, &refs, Matching::Lenient).unwrap()
    }

    fn emit(records: &[ContentRecord], learn: &NavigationTree, api: &[(String, NavigationTree)]) -> PageRegistry {
        let roots = SlugRoots::default();
        let mut registry = PageRegistry::new();
        PageEmitter::new(&roots, learn, api)
            .emit(records, &mut registry)
            .unwrap();
        registry
    }

    #[test]
    fn test_templates_by_classification() {
        let mut api = record("fs", "fs", "/api/v18/fs/", Some("api"));
        api.category = Category::Api;
        api.frontmatter.version = Some("v18".to_owned());
        let mut general = record("about", "About", "about", None);
        general.category = Category::None;
        let records = vec![
            record("intro", "Intro", "/learn/intro/", None),
            api,
            blog_post("hello", (2022, 11, 11), Some("news")),
            general,
        ];
        let learn = NavigationTree::default();

        let registry = emit(&records, &learn, &[]);

        assert_eq!(registry.get("/learn/intro/").unwrap().template, Template::Learn);
        assert_eq!(registry.get("/api/v18/fs/").unwrap().template, Template::Api);
        assert_eq!(
            registry.get("/blog/news/2022/11/11/hello").unwrap().template,
            Template::Blog
        );
        assert_eq!(registry.get("/about").unwrap().template, Template::General);
        assert_eq!(
            registry.get("/about").unwrap().context["slug"],
            json!("about")
        );
    }

    #[test]
    fn test_learn_context_and_landing() {
        let records = vec![
            record("intro", "Intro", "/learn/intro/", None),
            record("install", "Install", "/learn/install/", None),
        ];
        let learn = learn_tree(&records);

        let registry = emit(&records, &learn, &[]);

        let install = &registry.get("/learn/install/").unwrap().context;
        assert_eq!(install["previous"], json!({"slug": "/learn/intro/", "title": "Intro"}));
        assert_eq!(install["next"], Value::Null);
        assert_eq!(install["navigationData"]["start"]["data"][1]["title"], json!("Install"));

        let landing = registry.get("/learn/").unwrap();
        assert_eq!(landing.template, Template::Learn);
        assert_eq!(landing.context, registry.get("/learn/intro/").unwrap().context);
    }

    #[test]
    fn test_no_landing_without_learn_navigation() {
        let records = vec![record("intro", "Intro", "/learn/intro/", None)];
        let registry = emit(&records, &NavigationTree::default(), &[]);
        assert!(registry.get("/learn/").is_none());
    }

    #[test]
    fn test_blog_context_and_ordering() {
        let records = vec![
            blog_post("old", (2020, 1, 1), Some("news")),
            blog_post("new", (2022, 6, 1), Some("release")),
            blog_post("mid", (2021, 3, 15), Some("news")),
        ];

        let registry = emit(&records, &NavigationTree::default(), &[]);

        let mid = &registry.get("/blog/news/2021/03/15/mid").unwrap().context;
        assert_eq!(mid["date"], json!("2021-03-15"));
        assert_eq!(mid["authors"], json!(["alice"]));
        assert_eq!(mid["readingTime"]["text"], json!("1 min read"));
        assert_eq!(mid["readingTime"]["words"], json!(3));
        assert_eq!(mid["categoryName"], json!("news"));
        assert_eq!(mid["previous"]["slug"], json!("/blog/release/2022/06/01/new"));
        assert_eq!(mid["next"]["slug"], json!("/blog/news/2020/01/01/old"));

        let news = registry.get("/blog/news/").unwrap();
        assert_eq!(news.template, Template::BlogCategory);
        assert_eq!(
            news.context["posts"],
            json!(["/blog/news/2021/03/15/mid", "/blog/news/2020/01/01/old"])
        );
        assert!(registry.get("/blog/release/").is_some());
    }

    #[test]
    fn test_api_context_uses_version_navigation() {
        let mut fs_page = record("fs", "fs", "/api/v18/fs/", Some("api"));
        fs_page.category = Category::Api;
        fs_page.frontmatter.version = Some("v18".to_owned());
        let records = vec![fs_page];
        let refs: Vec<_> = records.iter().collect();
        let descriptor = NavigationDescriptor::parse("modules:\n  - fs\n").unwrap();
        let api = vec![(
            "v18".to_owned(),
            build_navigation(&descriptor, &refs, Matching::Lenient).unwrap(),
        )];

        let registry = emit(&records, &NavigationTree::default(), &api);

        let context = &registry.get("/api/v18/fs/").unwrap().context;
        assert_eq!(context["version"], json!("v18"));
        assert_eq!(context["navigationData"]["modules"]["data"][0]["slug"], json!("/api/v18/fs/"));
        assert_eq!(context["previous"], Value::Null);
    }

    #[test]
    fn test_is_under() {
        assert!(is_under("/blog/a", "/blog"));
        assert!(is_under("/blog", "/blog/"));
        assert!(!is_under("/blogger/a", "/blog"));
        assert!(!is_under("/a", "/"));
    }
}

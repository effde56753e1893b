//! Registry of routable pages.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::i18n::LocaleStore;

/// Presentation template of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Template {
    /// Learn section page.
    Learn,
    /// API documentation page.
    Api,
    /// Blog post.
    Blog,
    /// Listing of one blog category.
    BlogCategory,
    /// Any other page.
    General,
}

/// A page handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    /// URL path, always starting with `/`.
    pub path: String,
    /// Template to render with.
    pub template: Template,
    /// Template data.
    pub context: Map<String, Value>,
}

impl PageRecord {
    /// Create a page, ensuring a leading `/` on `path`.
    #[must_use]
    pub fn new(path: &str, template: Template, context: Map<String, Value>) -> Self {
        Self {
            path: page_path(path),
            template,
            context,
        }
    }
}

/// Page path for a slug: the slug with a leading `/`.
#[must_use]
pub fn page_path(slug: &str) -> String {
    if slug.starts_with('/') {
        slug.to_owned()
    } else {
        format!("/{slug}")
    }
}

/// Pages keyed by path, in registration order.
///
/// Registering a path twice replaces the earlier page in place, so
/// re-registration is idempotent and the latest context wins.
#[derive(Debug, Default, Clone)]
pub struct PageRegistry {
    pages: Vec<PageRecord>,
    path_index: HashMap<String, usize>,
}

impl PageRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page. Returns `true` if an earlier page was replaced.
    pub fn register(&mut self, page: PageRecord) -> bool {
        if let Some(&i) = self.path_index.get(&page.path) {
            tracing::debug!(path = %page.path, "Replacing page registration");
            self.pages[i] = page;
            true
        } else {
            self.path_index.insert(page.path.clone(), self.pages.len());
            self.pages.push(page);
            false
        }
    }

    /// Page at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&PageRecord> {
        self.path_index.get(path).map(|&i| &self.pages[i])
    }

    /// Pages in registration order.
    #[must_use]
    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Attach locale data to every page context.
    ///
    /// Each context gains `locale` (kept if already set, else the default
    /// locale) and `intlMessages` (the bundle for that locale, falling back
    /// to the default bundle). Paths and templates are untouched.
    pub fn localize(&mut self, store: &LocaleStore) {
        for page in &mut self.pages {
            let requested = page
                .context
                .get("locale")
                .and_then(Value::as_str)
                .unwrap_or(store.default_locale());
            let locale = store.resolve(requested).to_owned();

            let messages: Map<String, Value> = store
                .lookup(&locale)
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();

            page.context.insert("locale".to_owned(), Value::String(locale));
            page.context
                .insert("intlMessages".to_owned(), Value::Object(messages));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::MessageBundle;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_new_ensures_leading_slash() {
        let page = PageRecord::new("about-us", Template::General, Map::new());
        assert_eq!(page.path, "/about-us");
    }

    #[test]
    fn test_duplicate_registration_keeps_last_context() {
        let mut registry = PageRegistry::new();

        let replaced_first =
            registry.register(PageRecord::new("/foo/", Template::General, context(json!({"n": 1}))));
        registry.register(PageRecord::new("/bar/", Template::General, Map::new()));
        let replaced_second =
            registry.register(PageRecord::new("/foo/", Template::Learn, context(json!({"n": 2}))));

        assert!(!replaced_first);
        assert!(replaced_second);
        assert_eq!(registry.len(), 2);
        let foo: Vec<_> = registry.pages().iter().filter(|p| p.path == "/foo/").collect();
        assert_eq!(foo.len(), 1);
        assert_eq!(foo[0].context, context(json!({"n": 2})));
        assert_eq!(foo[0].template, Template::Learn);
        assert_eq!(registry.pages()[0].path, "/foo/");
    }

    #[test]
    fn test_localize_adds_locale_and_messages() {
        let store = LocaleStore::new(
            "en",
            [
                (
                    "en".to_owned(),
                    MessageBundle::from([("hello".to_owned(), "Hello".to_owned())]),
                ),
                (
                    "fr".to_owned(),
                    MessageBundle::from([("hello".to_owned(), "Bonjour".to_owned())]),
                ),
            ],
        )
        .unwrap();
        let mut registry = PageRegistry::new();
        registry.register(PageRecord::new("/a/", Template::General, Map::new()));
        registry.register(PageRecord::new(
            "/fr/a/",
            Template::General,
            context(json!({"locale": "fr"})),
        ));
        registry.register(PageRecord::new(
            "/xx/a/",
            Template::General,
            context(json!({"locale": "xx"})),
        ));

        registry.localize(&store);

        assert_eq!(
            Value::Object(registry.get("/a/").unwrap().context.clone()),
            json!({"locale": "en", "intlMessages": {"hello": "Hello"}})
        );
        assert_eq!(
            registry.get("/fr/a/").unwrap().context["intlMessages"],
            json!({"hello": "Bonjour"})
        );
        assert_eq!(
            registry.get("/xx/a/").unwrap().context["intlMessages"],
            json!({"hello": "Hello"})
        );
        assert_eq!(registry.get("/xx/a/").unwrap().context["locale"], json!("en"));
        assert_eq!(registry.get("/xx/a/").unwrap().template, Template::General);
    }

    #[test]
    fn test_template_serialization() {
        assert_eq!(
            serde_json::to_value(Template::BlogCategory).unwrap(),
            json!("blogCategory")
        );
    }
}

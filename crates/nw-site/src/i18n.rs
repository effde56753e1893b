//! Locale message store.
//!
//! Bundles are loaded once per build from `<messages_dir>/<code>.json` and
//! flattened to dotted keys (`{"nav": {"learn": "Learn"}}` becomes
//! `nav.learn`). The store is immutable and passed by reference to page
//! construction.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Flattened messages of one locale.
pub type MessageBundle = BTreeMap<String, String>;

/// Error loading locale bundles.
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    /// A bundle file could not be read.
    #[error("Failed to read locale bundle {}: {source}", path.display())]
    Io {
        /// Bundle path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A bundle file is not a JSON object.
    #[error("Invalid locale bundle {}: {message}", path.display())]
    Parse {
        /// Bundle path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// The default locale has no bundle.
    #[error("Default locale '{0}' is not in the locale list")]
    MissingDefault(String),
}

/// Immutable per-build store of locale bundles.
#[derive(Debug, Clone)]
pub struct LocaleStore {
    default: String,
    locales: Vec<String>,
    bundles: BTreeMap<String, MessageBundle>,
}

impl LocaleStore {
    /// Build a store from in-memory bundles.
    ///
    /// Locale order follows the iteration order of `bundles`.
    ///
    /// # Errors
    ///
    /// Returns [`LocaleError::MissingDefault`] if `default` has no bundle.
    pub fn new(
        default: &str,
        bundles: impl IntoIterator<Item = (String, MessageBundle)>,
    ) -> Result<Self, LocaleError> {
        let mut locales = Vec::new();
        let mut map = BTreeMap::new();
        for (code, bundle) in bundles {
            if !map.contains_key(&code) {
                locales.push(code.clone());
            }
            map.insert(code, bundle);
        }
        if !map.contains_key(default) {
            return Err(LocaleError::MissingDefault(default.to_owned()));
        }
        Ok(Self {
            default: default.to_owned(),
            locales,
            bundles: map,
        })
    }

    /// Load one bundle per locale from `messages_dir`.
    ///
    /// # Errors
    ///
    /// Fails if any bundle is missing or malformed, or if `default` is not
    /// one of `locales`.
    pub fn load(messages_dir: &Path, default: &str, locales: &[String]) -> Result<Self, LocaleError> {
        if !locales.iter().any(|l| l == default) {
            return Err(LocaleError::MissingDefault(default.to_owned()));
        }

        let bundles = locales
            .iter()
            .map(|code| {
                let path = messages_dir.join(format!("{code}.json"));
                load_bundle(&path).map(|bundle| (code.clone(), bundle))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let store = Self::new(default, bundles)?;
        tracing::debug!(
            default = %store.default,
            locale_count = store.locales.len(),
            "Locale bundles loaded"
        );
        Ok(store)
    }

    /// Default locale code.
    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default
    }

    /// Supported locale codes in configuration order.
    #[must_use]
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Whether `code` has a bundle.
    #[must_use]
    pub fn is_supported(&self, code: &str) -> bool {
        self.bundles.contains_key(code)
    }

    /// `code` if supported, else the default locale.
    #[must_use]
    pub fn resolve<'a>(&'a self, code: &'a str) -> &'a str {
        if self.is_supported(code) {
            code
        } else {
            &self.default
        }
    }

    /// Bundle for `code`, or the default bundle for an unknown code.
    #[must_use]
    pub fn lookup(&self, code: &str) -> &MessageBundle {
        self.bundles
            .get(code)
            .or_else(|| self.bundles.get(&self.default))
            .unwrap_or_else(|| empty_bundle())
    }

    /// Message `key` for `code`, falling back to the default bundle.
    #[must_use]
    pub fn message(&self, code: &str, key: &str) -> Option<&str> {
        self.lookup(code)
            .get(key)
            .or_else(|| self.lookup(&self.default).get(key))
            .map(String::as_str)
    }
}

fn empty_bundle() -> &'static MessageBundle {
    static EMPTY: MessageBundle = BTreeMap::new();
    &EMPTY
}

fn load_bundle(path: &Path) -> Result<MessageBundle, LocaleError> {
    let content = fs::read_to_string(path).map_err(|source| LocaleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bundle(&content).map_err(|message| LocaleError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse a JSON bundle and flatten it to dotted keys.
fn parse_bundle(content: &str) -> Result<MessageBundle, String> {
    let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let Value::Object(_) = value else {
        return Err("expected a JSON object".to_owned());
    };
    let mut bundle = MessageBundle::new();
    flatten_into(&mut bundle, String::new(), &value);
    Ok(bundle)
}

fn flatten_into(bundle: &mut MessageBundle, prefix: String, value: &Value) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_owned()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(bundle, join(key), child);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten_into(bundle, join(&i.to_string()), child);
            }
        }
        Value::String(s) => {
            bundle.insert(prefix, s.clone());
        }
        Value::Number(n) => {
            bundle.insert(prefix, n.to_string());
        }
        Value::Bool(b) => {
            bundle.insert(prefix, b.to_string());
        }
        Value::Null => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn bundle(pairs: &[(&str, &str)]) -> MessageBundle {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn store() -> LocaleStore {
        LocaleStore::new(
            "en",
            [
                ("en".to_owned(), bundle(&[("nav.learn", "Learn"), ("nav.blog", "Blog")])),
                ("es".to_owned(), bundle(&[("nav.learn", "Aprender")])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_known_locale() {
        assert_eq!(store().lookup("es"), &bundle(&[("nav.learn", "Aprender")]));
    }

    #[test]
    fn test_unknown_locale_returns_default_bundle() {
        let store = store();
        assert_eq!(store.lookup("xx"), store.lookup("en"));
        assert_eq!(store.resolve("xx"), "en");
        assert_eq!(store.resolve("es"), "es");
    }

    #[test]
    fn test_message_falls_back_to_default() {
        let store = store();
        assert_eq!(store.message("es", "nav.learn"), Some("Aprender"));
        assert_eq!(store.message("es", "nav.blog"), Some("Blog"));
        assert_eq!(store.message("xx", "nav.learn"), Some("Learn"));
        assert_eq!(store.message("en", "missing"), None);
    }

    #[test]
    fn test_missing_default_is_error() {
        let result = LocaleStore::new("fr", [("en".to_owned(), MessageBundle::new())]);
        assert!(matches!(result, Err(LocaleError::MissingDefault(code)) if code == "fr"));
    }

    #[test]
    fn test_parse_flattens_nested_objects() {
        let parsed = parse_bundle(
            r#"{"nav": {"learn": "Learn", "count": 3}, "flags": [true], "skip": null, "title": "Node.js"}"#,
        )
        .unwrap();

        assert_eq!(
            parsed,
            bundle(&[
                ("flags.0", "true"),
                ("nav.count", "3"),
                ("nav.learn", "Learn"),
                ("title", "Node.js"),
            ])
        );
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_bundle("[1, 2]").is_err());
        assert!(parse_bundle("{ not json").is_err());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("en.json"), r#"{"hello": "Hello"}"#).unwrap();
        fs::write(dir.path().join("de.json"), r#"{"hello": "Hallo"}"#).unwrap();

        let store =
            LocaleStore::load(dir.path(), "en", &["en".to_owned(), "de".to_owned()]).unwrap();

        assert_eq!(store.locales(), ["en".to_owned(), "de".to_owned()]);
        assert_eq!(store.message("de", "hello"), Some("Hallo"));
        assert_eq!(store.default_locale(), "en");
    }

    #[test]
    fn test_load_missing_bundle_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("en.json"), "{}").unwrap();

        let result = LocaleStore::load(dir.path(), "en", &["en".to_owned(), "fr".to_owned()]);

        assert!(matches!(result, Err(LocaleError::Io { .. })));
    }

    #[test]
    fn test_load_malformed_bundle_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("en.json"), "not json").unwrap();

        let result = LocaleStore::load(dir.path(), "en", &["en".to_owned()]);

        assert!(matches!(result, Err(LocaleError::Parse { .. })));
    }
}

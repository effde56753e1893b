//! Build manifest output.
//!
//! ```text
//! {output_dir}/
//! +-- pages.json        # [{ path, template, context }]
//! +-- redirects.json    # [{ fromPath, toPath, isPermanent, redirectInBrowser, statusCode }]
//! +-- i18n.json         # { defaultLocale, locales }
//! +-- data/
//!     +-- releases.json # { name, digest, payload }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use nw_data::Dataset;

use crate::error::SiteError;
use crate::i18n::LocaleStore;
use crate::pages::PageRecord;
use crate::redirects::RedirectEntry;

/// Page list file.
pub const PAGES_FILE: &str = "pages.json";
/// Redirect table file.
pub const REDIRECTS_FILE: &str = "redirects.json";
/// Locale wiring file.
pub const I18N_FILE: &str = "i18n.json";
/// Dataset directory.
pub const DATA_DIR: &str = "data";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct I18nManifest<'a> {
    default_locale: &'a str,
    locales: &'a [String],
}

/// Write `pages.json`.
pub fn write_pages(output_dir: &Path, pages: &[PageRecord]) -> Result<PathBuf, SiteError> {
    write_json(&output_dir.join(PAGES_FILE), pages)
}

/// Write `redirects.json`.
pub fn write_redirects(output_dir: &Path, entries: &[RedirectEntry]) -> Result<PathBuf, SiteError> {
    write_json(&output_dir.join(REDIRECTS_FILE), entries)
}

/// Write `i18n.json`.
pub fn write_i18n(output_dir: &Path, store: &LocaleStore) -> Result<PathBuf, SiteError> {
    let manifest = I18nManifest {
        default_locale: store.default_locale(),
        locales: store.locales(),
    };
    write_json(&output_dir.join(I18N_FILE), &manifest)
}

/// Write one `data/<name>.json` per dataset.
pub fn write_datasets(output_dir: &Path, datasets: &[Dataset]) -> Result<Vec<PathBuf>, SiteError> {
    let data_dir = output_dir.join(DATA_DIR);
    datasets
        .iter()
        .map(|dataset| write_json(&data_dir.join(format!("{}.json", dataset.name)), dataset))
        .collect()
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf, SiteError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
    }
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| SiteError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes).map_err(|e| SiteError::io(path, e))?;
    tracing::debug!(path = %path.display(), "Wrote manifest file");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::MessageBundle;
    use crate::pages::Template;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};
    use tempfile::TempDir;

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_write_pages() {
        let dir = TempDir::new().unwrap();
        let pages = vec![PageRecord::new("/a/", Template::General, Map::new())];

        let path = write_pages(&dir.path().join("public"), &pages).unwrap();

        assert_eq!(
            read(&path),
            json!([{"path": "/a/", "template": "general", "context": {}}])
        );
    }

    #[test]
    fn test_write_i18n() {
        let dir = TempDir::new().unwrap();
        let store = LocaleStore::new(
            "en",
            [
                ("en".to_owned(), MessageBundle::new()),
                ("de".to_owned(), MessageBundle::new()),
            ],
        )
        .unwrap();

        let path = write_i18n(dir.path(), &store).unwrap();

        assert_eq!(read(&path), json!({"defaultLocale": "en", "locales": ["en", "de"]}));
    }

    #[test]
    fn test_write_datasets() {
        let dir = TempDir::new().unwrap();
        let dataset = Dataset::new("nvm", json!({"version": "v0.40.1"}));

        let paths = write_datasets(dir.path(), std::slice::from_ref(&dataset)).unwrap();

        assert_eq!(paths, vec![dir.path().join("data/nvm.json")]);
        assert_eq!(
            read(&paths[0]),
            json!({"name": "nvm", "digest": dataset.digest, "payload": {"version": "v0.40.1"}})
        );
    }
}

//! Persistent cache in the project directory.
//!
//! Each bucket is a directory and each entry a file named after its key. An
//! entry file holds the etag on its first line followed by the raw value:
//!
//! ```text
//! <etag>\n<value bytes>
//! ```
//!
//! A `VERSION` file at the root records the cache layout version. Opening a
//! cache whose stored version differs clears the whole directory.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::{Cache, CacheBucket, is_valid_key};

const VERSION_FILE: &str = "VERSION";

/// File-backed [`Cache`].
///
/// ```text
/// {root}/
/// +-- VERSION
/// +-- datasets/
///     +-- releases
///     +-- banners
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root`, clearing it when `version` does not match
    /// the stored one.
    ///
    /// Failures are logged and leave a cache that simply misses.
    #[must_use]
    pub fn open(root: PathBuf, version: &str) -> Self {
        ensure_version(&root, version);
        Self { root }
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileBucket {
            dir: self.root.join(name),
        })
    }
}

struct FileBucket {
    dir: PathBuf,
}

impl FileBucket {
    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        if is_valid_key(key) {
            Some(self.dir.join(key))
        } else {
            tracing::debug!(key, "Rejected cache key");
            None
        }
    }

    /// Open an entry and read its etag line, leaving the reader at the value.
    fn open_entry(&self, key: &str) -> Option<(String, BufReader<File>)> {
        let path = self.entry_path(key)?;
        let mut reader = BufReader::new(File::open(path).ok()?);
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let etag = line.strip_suffix('\n')?.to_owned();
        Some((etag, reader))
    }
}

impl CacheBucket for FileBucket {
    fn etag(&self, key: &str) -> Option<String> {
        self.open_entry(key).map(|(etag, _)| etag)
    }

    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let (stored, mut reader) = self.open_entry(key)?;
        if !etag.is_empty() && stored != etag {
            return None;
        }
        let mut value = Vec::new();
        reader.read_to_end(&mut value).ok()?;
        Some(value)
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        if etag.contains('\n') {
            tracing::debug!(key, "Rejected multi-line cache etag");
            return;
        }
        let Some(path) = self.entry_path(key) else {
            return;
        };
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::debug!(error = %e, "Failed to create cache bucket");
            return;
        }

        let mut buf = Vec::with_capacity(etag.len() + 1 + value.len());
        buf.extend_from_slice(etag.as_bytes());
        buf.push(b'\n');
        buf.extend_from_slice(value);

        if let Err(e) = fs::write(&path, &buf) {
            tracing::debug!(path = %path.display(), error = %e, "Failed to write cache entry");
        }
    }

    fn remove(&self, key: &str) {
        if let Some(path) = self.entry_path(key) {
            let _ = fs::remove_file(path);
        }
    }
}

fn ensure_version(root: &Path, version: &str) {
    let version_file = root.join(VERSION_FILE);

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored.trim() == version => return,
        Ok(stored) => {
            tracing::info!(stored = stored.trim(), current = version, "Cache version changed, clearing");
        }
        Err(_) => tracing::debug!(root = %root.display(), "Initializing cache"),
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!(error = %e, "Failed to clear cache directory");
    }
    if let Err(e) = fs::create_dir_all(root).and_then(|()| fs::write(&version_file, version)) {
        tracing::warn!(error = %e, "Failed to initialize cache directory");
    }
}

//! Content ingestion errors.

use std::path::PathBuf;

/// Error raised while ingesting a content file.
///
/// Every variant is fatal for the build: a record that fails ingestion never
/// receives a partial slug.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Reading a content file or directory failed.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// File or directory being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The frontmatter block is not valid YAML.
    #[error("Invalid frontmatter in {}: {message}", path.display())]
    Frontmatter {
        /// Content file path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// A file under the blog root does not follow `YYYY-MM-DD-<name>.md`.
    #[error("Malformed blog filename {}: expected YYYY-MM-DD-<name>.md", path.display())]
    MalformedBlogFilename {
        /// Content file path.
        path: PathBuf,
    },
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

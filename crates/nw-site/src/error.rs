//! Site build errors.

use std::path::PathBuf;

use nw_config::ConfigError;
use nw_content::ContentError;
use nw_data::FetchError;

use crate::i18n::LocaleError;
use crate::navigation::NavigationError;

/// Error raised while building the site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Content ingestion failed.
    #[error(transparent)]
    Content(#[from] ContentError),
    /// A dataset could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Locale bundles could not be loaded.
    #[error(transparent)]
    Locale(#[from] LocaleError),
    /// A navigation descriptor is invalid.
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    /// The static redirect map is invalid.
    #[error("Invalid redirect map {}: {message}", path.display())]
    RedirectMap {
        /// Redirect map path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// Reading an input or writing an output failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Serializing a page context value failed.
    #[error("Failed to build page context for {path}: {source}")]
    PageContext {
        /// Page path.
        path: String,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
    /// Serializing a manifest file failed.
    #[error("Failed to serialize {}: {source}", path.display())]
    Serialize {
        /// Output file.
        path: PathBuf,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

//! Site assembly for nodeweb.
//!
//! This crate turns ingested content and fetched datasets into the build
//! manifest consumed by the presentation layer:
//!
//! - [`LocaleStore`]: per-locale message bundles with default fallback
//! - [`build_navigation`]: navigation trees from YAML descriptors
//! - [`ApiCatalog`]: API versions, latest version and default redirects
//! - [`RedirectTableBuilder`]: locale-expanded redirect table
//! - [`PageEmitter`] and [`PageRegistry`]: routable pages with templates
//! - [`SiteBuilder`]: the full build pipeline
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use nw_config::Config;
//! use nw_site::SiteBuilder;
//!
//! let config = Config::load(None, None)?;
//! let report = SiteBuilder::new(config).build()?;
//! println!("{} pages", report.page_count);
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod emitter;
mod error;
mod i18n;
pub mod manifest;
mod navigation;
mod pages;
mod redirects;

pub use api::ApiCatalog;
pub use builder::{BuildReport, DatasetReport, DatasetStatus, SiteBuilder};
pub use emitter::PageEmitter;
pub use error::SiteError;
pub use i18n::{LocaleError, LocaleStore, MessageBundle};
pub use navigation::{
    DescriptorItem, DescriptorSection, Matching, NavEntry, NavSection, NavigationDescriptor,
    NavigationError, NavigationTree, build_navigation,
};
pub use pages::{PageRecord, PageRegistry, Template, page_path};
pub use redirects::{
    ApiSeed, REDIRECT_STATUS, RedirectEntry, RedirectTable, RedirectTableBuilder, load_static_map,
};

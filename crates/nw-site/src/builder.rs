//! Site build orchestration.
//!
//! A build runs in two phases:
//!
//! 1. Content ingestion and dataset fetching, run side by side on the rayon
//!    pool. Both are fatal on failure.
//! 2. Navigation, redirects and pages, built single-threaded from the
//!    phase 1 results, then written to the output directory.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use nw_cache::{Cache, FileCache, NullCache};
use nw_config::Config;
use nw_content::{Category, ContentLoader, ContentRecord, SlugDeriver, SlugRoots};
use nw_data::{
    DATASET_BUCKET, Dataset, DatasetSource, Freshness, HttpFetch, UreqFetch, fetch_all,
    load_cached, standard_sources, sync_cache,
};

use crate::api::ApiCatalog;
use crate::emitter::PageEmitter;
use crate::error::SiteError;
use crate::i18n::LocaleStore;
use crate::manifest;
use crate::navigation::{Matching, NavigationDescriptor, build_navigation};
use crate::pages::PageRegistry;
use crate::redirects::{ApiSeed, RedirectTableBuilder, load_static_map};

/// Version of the on-disk cache layout.
const CACHE_VERSION: &str = "1";

/// Outcome for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetStatus {
    /// Fetched and different from the previous build.
    Changed,
    /// Fetched and identical to the previous build.
    Unchanged,
    /// Taken from the cache without fetching.
    Cached,
}

impl From<Freshness> for DatasetStatus {
    fn from(freshness: Freshness) -> Self {
        match freshness {
            Freshness::Changed => Self::Changed,
            Freshness::Unchanged => Self::Unchanged,
        }
    }
}

/// Dataset summary for a build report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReport {
    /// Dataset name.
    pub name: String,
    /// Content digest.
    pub digest: String,
    /// How the dataset was obtained.
    pub status: DatasetStatus,
}

/// Summary of a completed build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Directory the manifest was written to.
    pub output_dir: PathBuf,
    /// Ingested content records.
    pub record_count: usize,
    /// Emitted pages.
    pub page_count: usize,
    /// Emitted redirect entries.
    pub redirect_count: usize,
    /// Supported locales.
    pub locale_count: usize,
    /// Published datasets.
    pub datasets: Vec<DatasetReport>,
    /// Wall-clock build time.
    pub elapsed: Duration,
}

/// Runs the site build described by a [`Config`].
pub struct SiteBuilder {
    config: Config,
    http: Box<dyn HttpFetch>,
    cache: Box<dyn Cache>,
    offline: bool,
}

impl SiteBuilder {
    /// Create a builder using HTTP and the cache settings from `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let http: Box<dyn HttpFetch> =
            Box::new(UreqFetch::new(Duration::from_secs(config.data.timeout_secs)));
        let cache: Box<dyn Cache> = if config.build.cache_enabled {
            Box::new(FileCache::open(config.build.cache_dir(), CACHE_VERSION))
        } else {
            Box::new(NullCache)
        };
        Self {
            config,
            http,
            cache,
            offline: false,
        }
    }

    /// Replace the HTTP client.
    #[must_use]
    pub fn with_http(mut self, http: Box<dyn HttpFetch>) -> Self {
        self.http = http;
        self
    }

    /// Replace the cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Box<dyn Cache>) -> Self {
        self.cache = cache;
        self
    }

    /// Use cached datasets instead of fetching.
    #[must_use]
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// URL roots from the route configuration.
    #[must_use]
    pub fn slug_roots(&self) -> SlugRoots {
        let routes = &self.config.routes;
        SlugRoots {
            blog: routes.blog.clone(),
            learn: routes.learn.clone(),
            api: routes.api.clone(),
        }
    }

    fn sources(&self) -> Vec<Box<dyn DatasetSource>> {
        let data = &self.config.data;
        standard_sources(&data.releases_url, &data.banners_url, &data.nvm_url)
    }

    /// Obtain every dataset, fetching unless offline.
    ///
    /// Returns no datasets when data sourcing is disabled.
    pub fn fetch_datasets(&self) -> Result<(Vec<Dataset>, Vec<DatasetReport>), SiteError> {
        if !self.config.data.enabled {
            tracing::info!("Dataset sourcing disabled");
            return Ok((Vec::new(), Vec::new()));
        }

        let sources = self.sources();
        let bucket = self.cache.bucket(DATASET_BUCKET);

        let (datasets, statuses) = if self.offline {
            let datasets = load_cached(&sources, bucket.as_ref())?;
            let statuses = vec![DatasetStatus::Cached; datasets.len()];
            (datasets, statuses)
        } else {
            let datasets = fetch_all(&sources, self.http.as_ref())?;
            let statuses = sync_cache(&datasets, bucket.as_ref())
                .into_iter()
                .map(DatasetStatus::from)
                .collect();
            (datasets, statuses)
        };

        let reports = datasets
            .iter()
            .zip(statuses)
            .map(|(dataset, status)| DatasetReport {
                name: dataset.name.clone(),
                digest: dataset.digest.clone(),
                status,
            })
            .collect();
        Ok((datasets, reports))
    }

    /// Fetch datasets and write `data/*.json` only.
    pub fn fetch(&self) -> Result<Vec<DatasetReport>, SiteError> {
        let (datasets, reports) = self.fetch_datasets()?;
        manifest::write_datasets(&self.config.build.output_dir, &datasets)?;
        Ok(reports)
    }

    /// Ingest content from the configured directories.
    pub fn load_content(&self) -> Result<Vec<ContentRecord>, SiteError> {
        let deriver = SlugDeriver::new(self.config.content.blog_dir(), self.slug_roots());
        let loader = ContentLoader::new(self.config.content.dir.clone(), deriver);
        Ok(loader.load()?)
    }

    /// Run the full build and write the manifest.
    pub fn build(&self) -> Result<BuildReport, SiteError> {
        let start = Instant::now();
        let config = &self.config;

        let locales = LocaleStore::load(
            &config.i18n.messages_dir,
            &config.i18n.default,
            &config.i18n.locales,
        )?;

        let (records, fetched) = rayon::join(|| self.load_content(), || self.fetch_datasets());
        let records = records?;
        let (datasets, dataset_reports) = fetched?;

        let matching = Matching::from_strict(config.navigation.strict);
        let roots = self.slug_roots();

        let learn_descriptor = NavigationDescriptor::load(&config.navigation.learn)?;
        let learn_records: Vec<&ContentRecord> = records
            .iter()
            .filter(|r| r.category == Category::Learn)
            .collect();
        let learn_navigation = build_navigation(&learn_descriptor, &learn_records, matching)?;

        let catalog = ApiCatalog::new(&records);
        let api_descriptor = NavigationDescriptor::load(&config.navigation.api_types)?;
        let api_navigation = catalog.navigation(&api_descriptor, matching)?;

        let seed = catalog.latest().map(|latest| ApiSeed {
            root: &config.routes.api,
            latest,
            landing: &config.routes.api_landing,
        });
        let static_map = load_static_map(&config.redirects.file)?;
        let redirects = RedirectTableBuilder::new()
            .api_defaults(&catalog.default_redirects(&config.routes.api))
            .api_seed(seed.as_ref())
            .static_map(&static_map)
            .build(locales.locales());

        let mut registry = PageRegistry::new();
        PageEmitter::new(&roots, &learn_navigation, &api_navigation).emit(&records, &mut registry)?;
        registry.localize(&locales);

        let output_dir = &config.build.output_dir;
        manifest::write_pages(output_dir, registry.pages())?;
        manifest::write_redirects(output_dir, redirects.entries())?;
        manifest::write_i18n(output_dir, &locales)?;
        manifest::write_datasets(output_dir, &datasets)?;

        let report = BuildReport {
            output_dir: output_dir.clone(),
            record_count: records.len(),
            page_count: registry.len(),
            redirect_count: redirects.len(),
            locale_count: locales.locales().len(),
            datasets: dataset_reports,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            records = report.record_count,
            pages = report.page_count,
            redirects = report.redirect_count,
            "Site build completed"
        );
        Ok(report)
    }
}

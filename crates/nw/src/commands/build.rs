//! `nw build` command implementation.

use std::path::PathBuf;

use clap::Args;
use nw_config::{CliSettings, Config};
use nw_site::SiteBuilder;

use crate::commands::print_datasets;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover nodeweb.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the manifest (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Use datasets from the last fetch instead of the network.
    #[arg(long)]
    offline: bool,

    /// Disable the dataset cache.
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.content_dir,
            output_dir: self.output_dir,
            cache_enabled: self.no_cache.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.highlight("nodeweb build");
        output.separator();
        output.field("Content", &config.content.dir.display().to_string());
        output.field("Output", &config.build.output_dir.display().to_string());
        if self.offline {
            output.warning("Offline: datasets come from the cache");
        }

        let report = SiteBuilder::new(config).offline(self.offline).build()?;

        output.separator();
        output.info(&format!(
            "{} records, {} pages, {} redirects, {} locales",
            report.record_count, report.page_count, report.redirect_count, report.locale_count
        ));
        print_datasets(&output, &report.datasets);
        output.success(&format!(
            "Built {} in {:.2}s",
            report.output_dir.display(),
            report.elapsed.as_secs_f64()
        ));

        Ok(())
    }
}

//! `nw fetch` command implementation.

use std::path::PathBuf;

use clap::Args;
use nw_config::{CliSettings, Config};
use nw_site::SiteBuilder;

use crate::commands::print_datasets;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the fetch command.
#[derive(Args)]
pub(crate) struct FetchArgs {
    /// Path to configuration file (default: auto-discover nodeweb.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for `data/*.json` (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Disable the dataset cache.
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl FetchArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output_dir,
            cache_enabled: self.no_cache.then_some(false),
            data_enabled: Some(true),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let output_dir = config.build.output_dir.clone();

        output.highlight("nodeweb fetch");
        output.field("Output", &output_dir.display().to_string());
        let datasets = SiteBuilder::new(config).fetch()?;
        print_datasets(&output, &datasets);
        output.success(&format!(
            "Wrote {} datasets to {}",
            datasets.len(),
            output_dir.join("data").display()
        ));

        Ok(())
    }
}

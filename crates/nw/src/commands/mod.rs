//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod fetch;

pub(crate) use build::BuildArgs;
pub(crate) use fetch::FetchArgs;

use nw_site::{DatasetReport, DatasetStatus};

use crate::output::Output;

/// Print one line per dataset.
pub(crate) fn print_datasets(output: &Output, datasets: &[DatasetReport]) {
    for dataset in datasets {
        let short = &dataset.digest[..dataset.digest.len().min(12)];
        let line = format!("  {} ({short})", dataset.name);
        match dataset.status {
            DatasetStatus::Changed => output.success(&format!("{line} updated")),
            DatasetStatus::Unchanged => output.info(&format!("{line} unchanged")),
            DatasetStatus::Cached => output.warning(&format!("{line} from cache")),
        }
    }
}

//! nodeweb CLI - site builder.
//!
//! Provides commands for:
//! - `build`: Ingest content, fetch datasets and write the build manifest
//! - `fetch`: Fetch external datasets only

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, FetchArgs};
use output::Output;

/// nodeweb - build-time content pipeline for the Node.js website.
#[derive(Parser)]
#[command(name = "nw", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build pages, redirects, datasets and locale wiring.
    Build(BuildArgs),
    /// Fetch external datasets into the output directory.
    Fetch(FetchArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Build(args) => args.verbose,
            Self::Fetch(args) => args.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Fetch(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

//! genconf CLI - Validate generator configurations
//!
//! This is the main entry point for the genconf command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::{Context as _, Result};
use clap::Parser;
use genconf_core::{ConfigValidator, HierarchicalSettingsLoader};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use commands::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let mut settings = HierarchicalSettingsLoader::new()
        .and_then(|loader| loader.load())
        .context("Failed to load genconf settings")?;

    // CLI flags take precedence over settings file and environment
    if let Some(max_depth) = cli.max_depth {
        settings.max_depth = max_depth as usize;
    }
    debug!(max_depth = settings.max_depth, "effective settings");

    let ctx = Context {
        validator: ConfigValidator::with_options(settings.validation_options()),
        settings,
    };

    match cli.command {
        Commands::Validate(args) => commands::validate::run(args, &ctx),
        Commands::Show(args) => commands::show::run(args, &ctx),
        Commands::Scan(args) => commands::scan::run(args, &ctx).await,
        Commands::Version(args) => commands::version::run(args),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

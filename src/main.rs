//! em-preview - live preview for markup sources.
//!
//! Every edit is compiled; failures become inline markers on the editing
//! surface while the last good output stays visible.

mod actor;
mod cli;
mod compiler;
mod config;
mod core;
mod embed;
mod logger;
mod preview;
mod reload;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PreviewConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(PreviewConfig::load(&cli)?);
    if let Some(path) = &config.config_path {
        debug!("config"; "{} (backend {:?})", path.display(), config.compiler.backend);
    }

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(config),
        Commands::Watch { file, output } => cli::watch::watch(config, file, output.as_deref()),
        Commands::Build { file, output } => cli::build::build(&config, file, output.as_deref()),
    }
}

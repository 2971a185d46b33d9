//! texpane - live preview for LaTeX documents.
//!
//! Compiles the workspace when sources change, serves the artifact, and maps
//! text clicked in the rendered document back to the source line it came from.

#![allow(dead_code)]

mod cli;
mod compiler;
mod config;
mod core;
mod correlate;
mod freshness;
mod logger;
mod render;
mod utils;
mod watch;
mod workspace;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{PreviewConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(PreviewConfig::load(&cli)?);

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(&config),
        Commands::Compile { force, .. } => cli::compile::compile_once(&config, *force),
        Commands::Locate { text, json } => cli::locate::locate(&config, text, *json),
        Commands::Status { json } => cli::status::show_status(&config, *json),
    }
}

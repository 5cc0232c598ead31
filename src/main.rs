//! liveview - a headless client for server-rendered live views.

#![allow(dead_code)]

mod channel;
mod cli;
mod client;
mod config;
mod core;
mod dom;
mod event;
mod logger;
mod protocol;
mod view;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ClientConfig;

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

    let config = ClientConfig::load(&cli)?;

    match &cli.command {
        Commands::Connect { session } => cli::connect::run_session(&config, session),
        Commands::Views { page } => cli::views::list_views(&config, page),
        Commands::Endpoint { url, .. } => cli::views::print_endpoint(&config, url),
    }
}

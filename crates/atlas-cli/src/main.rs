//! atlas - CLI for the todo and semantic search services.
//!
//! Imports CSV data, serves or invokes the handlers locally, and calls
//! deployed endpoints with signed requests.

mod backend;
mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{data, import, invoke, search, serve, todos};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let config = Config::load(cli.global.config.as_deref())?.with_overrides(&cli.global);

    match cli.command {
        Commands::Import(args) => import::run(args, &config).await,
        Commands::Serve(args) => serve::run(args, &config).await,
        Commands::Invoke(args) => invoke::run(args, &config).await,
        Commands::Todos(cmd) => todos::handle(cmd, &config).await,
        Commands::Search(args) => search::run(args, &config).await,
        Commands::Data(cmd) => data::handle(cmd, &config).await,
    }
}

const LOG_TARGETS: &[&str] = &[
    "atlas",
    "atlas_core",
    "atlas_http",
    "atlas_file",
    "atlas_service",
    "tower_http",
];

/// Filter directives for a `-v` count. Dependencies stay at `warn`.
fn log_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => return "warn".to_string(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    LOG_TARGETS
        .iter()
        .fold("warn".to_string(), |acc, target| format!("{acc},{target}={level}"))
}

/// Logs go to stderr so stdout stays parseable JSON.
fn init_logging(verbosity: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(verbosity)));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

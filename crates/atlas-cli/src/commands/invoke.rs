//! Invoke command implementation.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use atlas_service::{ProxyEvent, lambda};

use crate::backend;
use crate::commands::read_input;
use crate::config::Config;
use crate::output;

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Handler {
    /// Todo CRUD
    Todos,
    /// Semantic search
    Search,
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Handler to run
    #[arg(value_enum)]
    pub handler: Handler,

    /// Proxy event JSON file (use - for stdin)
    #[arg(long, default_value = "-")]
    pub event: String,

    /// Pretty-print the response
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: InvokeArgs, config: &Config) -> Result<()> {
    let content = read_input(&args.event)?;
    let event: ProxyEvent = serde_json::from_str(&content).context("Invalid proxy event JSON")?;

    let app = backend::app(config)?;
    let response = match args.handler {
        Handler::Todos => lambda::todos(&app, &event).await,
        Handler::Search => lambda::search(&app, &event).await,
    };

    output::json_as(&response, args.pretty)
}

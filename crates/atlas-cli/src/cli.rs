//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{data, import, invoke, search, serve, todos};

/// Todo CRUD and semantic search over a Data API.
#[derive(Parser, Debug)]
#[command(name = "atlas")]
#[command(author, version = env!("ATLAS_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings that override the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Config file (defaults to the platform config dir's atlas/config.toml)
    #[arg(long, env = "ATLAS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// AWS region used for signing and the Bedrock endpoint
    #[arg(long, env = "ATLAS_REGION", global = true)]
    pub region: Option<String>,

    /// Data API base URL (https://... or file:///path)
    #[arg(long = "data-api", env = "ATLAS_DATA_API_URL", global = true)]
    pub data_api: Option<String>,

    /// Deployed services base URL, for the todos and search commands
    #[arg(long, env = "ATLAS_GATEWAY_URL", global = true)]
    pub gateway: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a CSV file into a collection, one document per row
    Import(import::ImportArgs),

    /// Serve the todos and search handlers over HTTP
    Serve(serve::ServeArgs),

    /// Run a handler once on an API Gateway proxy event
    Invoke(invoke::InvokeArgs),

    /// Call a deployed todos service
    Todos(todos::TodosCommand),

    /// Call a deployed semantic search service
    Search(search::SearchArgs),

    /// Issue Data API operations directly
    Data(data::DataCommand),
}

//! Direct Data API subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use atlas_core::{DataApi, Embedder, Namespace, Operation};
use atlas_service::search::build_query;

use crate::backend;
use crate::commands::read_input;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct DataCommand {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: DataSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum DataSubcommand {
    /// Insert one document
    InsertOne {
        /// Target as database.collection
        namespace: Namespace,

        /// Document JSON (use - for stdin)
        document: String,
    },

    /// Find documents matching a filter
    Find {
        /// Target as database.collection
        namespace: Namespace,

        /// Filter JSON
        #[arg(long, default_value = "{}")]
        filter: String,

        /// Return only the first match
        #[arg(long)]
        one: bool,
    },

    /// Embed a query and run a vector search
    VectorSearch {
        /// Free-text query
        query: String,

        /// Target as database.collection (defaults to the [search] namespace)
        #[arg(long)]
        namespace: Option<Namespace>,

        /// Maximum number of results (defaults to [search] default_limit)
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn parse_json(text: &str, what: &str) -> Result<Value> {
    serde_json::from_str(text).with_context(|| format!("Invalid {} JSON", what))
}

pub async fn handle(cmd: DataCommand, config: &Config) -> Result<()> {
    let api = backend::data_api(config)?;

    let operation = match cmd.command {
        DataSubcommand::InsertOne {
            namespace,
            document,
        } => {
            let document = if document == "-" {
                read_input("-")?
            } else {
                document
            };
            Operation::InsertOne {
                target: namespace,
                document: parse_json(&document, "document")?,
            }
        }

        DataSubcommand::Find {
            namespace,
            filter,
            one,
        } => {
            let filter = parse_json(&filter, "filter")?;
            if one {
                Operation::FindOne {
                    target: namespace,
                    filter,
                }
            } else {
                Operation::Find {
                    target: namespace,
                    filter,
                }
            }
        }

        DataSubcommand::VectorSearch {
            query,
            namespace,
            limit,
        } => {
            let settings = config.search.settings()?;
            let embedder = backend::embedder(config)?;
            let vector = embedder
                .embed(&query)
                .await
                .context("Failed to embed query")?;
            let search = build_query(
                &settings,
                vector,
                limit.unwrap_or(settings.default_limit),
            );
            Operation::Aggregate {
                target: namespace.unwrap_or(settings.namespace.clone()),
                pipeline: search.to_pipeline(),
            }
        }
    };

    let result = api
        .execute(&operation)
        .await
        .with_context(|| format!("{} failed", operation.name()))?;

    output::json_as(&result, cmd.pretty)
}

//! Import command implementation.

use std::fs::File;
use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Args;

use atlas_core::Namespace;
use atlas_core::pipeline::DEFAULT_PATH;
use atlas_service::RowShaper;
use atlas_service::import::import_csv;

use crate::backend;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file with a header row (use - for stdin)
    pub csv: String,

    /// Target database (defaults to the [search] database)
    #[arg(long)]
    pub database: Option<String>,

    /// Target collection (defaults to the [search] collection)
    #[arg(long)]
    pub collection: Option<String>,

    /// Columns starting with this prefix are gathered into the embedding
    #[arg(long, default_value = DEFAULT_PATH)]
    pub prefix: String,

    /// Field that receives the embedding (defaults to the [search] path)
    #[arg(long)]
    pub embedding_field: Option<String>,
}

pub async fn run(args: ImportArgs, config: &Config) -> Result<()> {
    let database = args.database.as_deref().unwrap_or(&config.search.database);
    let collection = args
        .collection
        .as_deref()
        .unwrap_or(&config.search.collection);
    let target = Namespace::new(database, collection).context("Invalid target namespace")?;

    let shaper = RowShaper::new(&args.prefix).with_embedding_field(
        args.embedding_field
            .clone()
            .unwrap_or_else(|| config.search.path.clone()),
    );

    let api = backend::data_api(config)?;

    let reader: Box<dyn Read> = if args.csv == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(File::open(&args.csv).with_context(|| format!("Failed to open {}", args.csv))?)
    };

    let summary = import_csv(reader, &target, &shaper, api.as_ref())
        .await
        .context("Import failed")?;

    output::json(&summary)?;
    output::success(&format!("Imported {} rows into {}", summary.rows, target));

    Ok(())
}

//! Search client command.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};

use atlas_core::HttpMethod;

use crate::backend;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,

    /// Maximum number of results (service default when omitted)
    #[arg(long)]
    pub limit: Option<u32>,
}

pub async fn run(args: SearchArgs, config: &Config) -> Result<()> {
    let (base, client) = backend::gateway(config)?;

    let mut body = Map::new();
    body.insert("query".into(), Value::from(args.query));
    if let Some(limit) = args.limit {
        body.insert("limit".into(), Value::from(limit));
    }

    let response = client
        .send(HttpMethod::Post, &base.endpoint_url("search"), Some(&body))
        .await
        .context("POST /search failed")?;

    output::status_and_body(&response);
    Ok(())
}

//! Serve command implementation.

use anyhow::{Context, Result};
use clap::Args;

use atlas_core::DataApi;
use atlas_service::router;

use crate::backend;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (defaults to [server] bind)
    #[arg(long, env = "ATLAS_BIND")]
    pub bind: Option<String>,
}

pub async fn run(args: ServeArgs, config: &Config) -> Result<()> {
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let app = backend::app(config)?;

    output::field("Data API", &app.data_api().describe());
    output::field("Listening", &format!("http://{}", bind));

    router::serve(app, &bind)
        .await
        .with_context(|| format!("Server on {} failed", bind))
}

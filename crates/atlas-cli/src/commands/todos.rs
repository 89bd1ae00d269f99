//! Todos client subcommands.
//!
//! Each call is one signed request to the deployed service; the status
//! and body are printed as received.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::{Map, Value, json};
use url::Url;

use atlas_core::{ApiUrl, HttpMethod};

use crate::backend;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct TodosCommand {
    #[command(subcommand)]
    pub command: TodosSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TodosSubcommand {
    /// List all todos
    List,

    /// Fetch one todo
    Get {
        id: String,
    },

    /// Create a todo
    Create {
        /// Title (omit to see the validation error)
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Update fields of a todo
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        completed: Option<bool>,
    },

    /// Delete a todo
    Delete {
        id: String,
    },
}

fn fields(pairs: [(&str, Option<Value>); 3]) -> Value {
    let mut body = Map::new();
    for (name, value) in pairs {
        if let Some(value) = value {
            body.insert(name.to_string(), value);
        }
    }
    Value::Object(body)
}

const COLLECTION: &str = "todos";

/// Path segments below the gateway base, unencoded.
type Segments = Vec<String>;

fn item(id: String) -> Segments {
    vec![COLLECTION.to_string(), id]
}

fn request(command: TodosSubcommand) -> (HttpMethod, Segments, Option<Value>) {
    match command {
        TodosSubcommand::List => (HttpMethod::Get, vec![COLLECTION.to_string()], None),
        TodosSubcommand::Get { id } => (HttpMethod::Get, item(id), None),
        TodosSubcommand::Create { title, description } => (
            HttpMethod::Post,
            vec![COLLECTION.to_string()],
            Some(fields([
                ("title", title.map(Value::from)),
                ("description", description.map(Value::from)),
                ("completed", None),
            ])),
        ),
        TodosSubcommand::Update {
            id,
            title,
            description,
            completed,
        } => (
            HttpMethod::Put,
            item(id),
            Some(fields([
                ("title", title.map(Value::from)),
                ("description", description.map(Value::from)),
                ("completed", completed.map(|c| json!(c))),
            ])),
        ),
        TodosSubcommand::Delete { id } => (HttpMethod::Delete, item(id), None),
    }
}

/// Append each segment percent-encoded, so an id never adds path
/// segments, a query or a fragment.
fn endpoint(base: &ApiUrl, segments: &[String]) -> Result<Url> {
    let mut url = Url::parse(base.as_str()).context("Invalid gateway URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Gateway URL cannot have a path: {}", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub async fn handle(cmd: TodosCommand, config: &Config) -> Result<()> {
    let (base, client) = backend::gateway(config)?;
    let (method, segments, body) = request(cmd.command);
    let url = endpoint(&base, &segments)?;

    let response = client
        .send(method, url.as_str(), body.as_ref())
        .await
        .with_context(|| format!("{} {} failed", method, url.path()))?;

    output::status_and_body(&response);
    Ok(())
}

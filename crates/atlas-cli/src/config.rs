//! Configuration file and override handling.
//!
//! Values come from, in increasing priority: built-in defaults, the TOML
//! config file, then flags and `ATLAS_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;

use atlas_core::ModelId;
use atlas_core::pipeline::{DEFAULT_INDEX, DEFAULT_NUM_CANDIDATES, DEFAULT_PATH, default_fields};
use atlas_service::search::{self, SearchSettings};
use atlas_service::todos::{self, IdStrategy, TodoSettings};

use crate::cli::GlobalArgs;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub aws: AwsConfig,
    pub data_api: DataApiConfig,
    pub gateway: GatewayConfig,
    pub todos: TodosConfig,
    pub search: SearchConfig,
    pub embedding: EmbeddingConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AwsConfig {
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataApiConfig {
    pub url: Option<String>,
    /// Overall request timeout; none unless set.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TodosConfig {
    pub database: String,
    pub collection: String,
    /// `native`, `object_id` or `field`.
    pub id_strategy: String,
    /// Field name for the `field` strategy.
    pub id_field: Option<String>,
}

impl Default for TodosConfig {
    fn default() -> Self {
        Self {
            database: todos::DEFAULT_DATABASE.to_string(),
            collection: todos::DEFAULT_COLLECTION.to_string(),
            id_strategy: "native".to_string(),
            id_field: None,
        }
    }
}

impl TodosConfig {
    pub fn settings(&self) -> Result<TodoSettings> {
        let namespace = atlas_core::Namespace::new(&self.database, &self.collection)
            .context("Invalid [todos] namespace")?;

        let mut id_strategy: IdStrategy = self
            .id_strategy
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("Invalid [todos] id_strategy")?;

        if let Some(field) = &self.id_field {
            match id_strategy {
                IdStrategy::Field(_) => id_strategy = IdStrategy::Field(field.clone()),
                _ => bail!("[todos] id_field is only used with id_strategy = \"field\""),
            }
        }

        Ok(TodoSettings {
            namespace,
            id_strategy,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub database: String,
    pub collection: String,
    pub index: String,
    pub path: String,
    pub num_candidates: u32,
    pub default_limit: u32,
    pub fields: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            database: search::DEFAULT_DATABASE.to_string(),
            collection: search::DEFAULT_COLLECTION.to_string(),
            index: DEFAULT_INDEX.to_string(),
            path: DEFAULT_PATH.to_string(),
            num_candidates: DEFAULT_NUM_CANDIDATES,
            default_limit: search::DEFAULT_LIMIT,
            fields: default_fields(),
        }
    }
}

impl SearchConfig {
    pub fn settings(&self) -> Result<SearchSettings> {
        let namespace = atlas_core::Namespace::new(&self.database, &self.collection)
            .context("Invalid [search] namespace")?;

        if self.default_limit == 0 {
            bail!("[search] default_limit must be at least 1");
        }

        Ok(SearchSettings {
            namespace,
            index: self.index.clone(),
            path: self.path.clone(),
            num_candidates: self.num_candidates,
            default_limit: self.default_limit,
            fields: self.fields.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Bedrock runtime base URL; derived from the region when unset.
    pub runtime_url: Option<String>,
    pub model: String,
    /// Expected vector length; unchecked when unset.
    pub dims: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            runtime_url: None,
            model: ModelId::TITAN_EMBED_TEXT_V1.to_string(),
            dims: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Default config file location.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "atlas").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// read if present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply flag and environment overrides.
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(region) = &args.region {
            self.aws.region = region.clone();
        }
        if let Some(url) = &args.data_api {
            self.data_api.url = Some(url.clone());
        }
        if let Some(url) = &args.gateway {
            self.gateway.url = Some(url.clone());
        }
        self
    }
}

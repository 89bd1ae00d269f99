//! Vector search pipeline builder.
//!
//! Produces the two-stage aggregate pipeline used for semantic search:
//! a `$vectorSearch` stage followed by a `$project` stage that keeps the
//! selected fields and attaches the similarity score.

use serde_json::{Map, Value, json};

use crate::error::{Error, InvalidInputError};

/// Default Atlas Search index name.
pub const DEFAULT_INDEX: &str = "vector_index";

/// Default document field holding the embedding.
pub const DEFAULT_PATH: &str = "details_embedding";

/// Default candidate pool size.
pub const DEFAULT_NUM_CANDIDATES: u32 = 100;

/// Name of the projected similarity score field.
pub const SCORE_FIELD: &str = "score";

/// `$meta` source for the similarity score.
pub const SCORE_META: &str = "vectorSearchScore";

/// Fields kept by the default projection.
pub fn default_fields() -> Vec<String> {
    vec!["_id".into(), "index".into(), "Place Name".into()]
}

/// A nearest-neighbour query over an embedding field.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSearch {
    pub index: String,
    pub path: String,
    pub query_vector: Vec<f64>,
    pub num_candidates: u32,
    pub limit: u32,
    /// Fields retained by the projection stage, in addition to the score.
    pub fields: Vec<String>,
}

impl VectorSearch {
    /// A query with the default index, path and projection.
    pub fn new(query_vector: Vec<f64>, limit: u32, num_candidates: u32) -> Self {
        Self {
            index: DEFAULT_INDEX.to_string(),
            path: DEFAULT_PATH.to_string(),
            query_vector,
            num_candidates,
            limit,
            fields: default_fields(),
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Build the aggregate pipeline stages.
    pub fn to_pipeline(&self) -> Vec<Value> {
        let mut project = Map::new();
        for field in &self.fields {
            project.insert(field.clone(), json!(1));
        }
        project.insert(SCORE_FIELD.to_string(), json!({"$meta": SCORE_META}));

        vec![
            json!({
                "$vectorSearch": {
                    "index": self.index,
                    "path": self.path,
                    "queryVector": self.query_vector,
                    "numCandidates": self.num_candidates,
                    "limit": self.limit,
                }
            }),
            json!({ "$project": project }),
        ]
    }

    /// Parse a pipeline produced by [`VectorSearch::to_pipeline`].
    ///
    /// The `$project` stage is optional; without it no fields are retained.
    pub fn from_pipeline(stages: &[Value]) -> Result<Self, Error> {
        let first = stages
            .first()
            .ok_or_else(|| pipeline_error("pipeline is empty"))?;
        let stage = first
            .get("$vectorSearch")
            .and_then(Value::as_object)
            .ok_or_else(|| pipeline_error("first stage must be $vectorSearch"))?;

        let index = required_str(stage, "index")?;
        let path = required_str(stage, "path")?;
        let num_candidates = required_u32(stage, "numCandidates")?;
        let limit = required_u32(stage, "limit")?;

        let query_vector = stage
            .get("queryVector")
            .and_then(Value::as_array)
            .ok_or_else(|| pipeline_error("$vectorSearch.queryVector must be an array"))?
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| pipeline_error("queryVector must contain only numbers"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fields = match stages.get(1).and_then(|s| s.get("$project")) {
            Some(Value::Object(project)) => project
                .iter()
                .filter(|(_, v)| v.get("$meta").is_none())
                .map(|(k, _)| k.clone())
                .collect(),
            Some(_) => return Err(pipeline_error("$project must be an object")),
            None => Vec::new(),
        };

        Ok(Self {
            index,
            path,
            query_vector,
            num_candidates,
            limit,
            fields,
        })
    }
}

fn required_str(stage: &Map<String, Value>, key: &str) -> Result<String, Error> {
    stage
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| pipeline_error(&format!("$vectorSearch.{} must be a string", key)))
}

fn required_u32(stage: &Map<String, Value>, key: &str) -> Result<u32, Error> {
    stage
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            pipeline_error(&format!(
                "$vectorSearch.{} must be a non-negative integer",
                key
            ))
        })
}

fn pipeline_error(reason: &str) -> Error {
    InvalidInputError::Pipeline {
        reason: reason.to_string(),
    }
    .into()
}

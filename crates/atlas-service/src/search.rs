//! Semantic search handler.

use serde_json::Value;
use tracing::{debug, info, instrument};

use atlas_core::pipeline::{DEFAULT_INDEX, DEFAULT_NUM_CANDIDATES, DEFAULT_PATH, default_fields};
use atlas_core::{DataApi, Embedder, Namespace, Operation, VectorSearch};

use crate::body::json_object;
use crate::{Result, ServiceError, ServiceResponse};

/// Default search database.
pub const DEFAULT_DATABASE: &str = "travel";

/// Default search collection.
pub const DEFAULT_COLLECTION: &str = "asia";

/// Result count when the request gives no `limit`.
pub const DEFAULT_LIMIT: u32 = 5;

/// Where and how semantic search runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub namespace: Namespace,
    pub index: String,
    pub path: String,
    pub num_candidates: u32,
    pub default_limit: u32,
    pub fields: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            namespace: Namespace::new(DEFAULT_DATABASE, DEFAULT_COLLECTION)
                .expect("default search namespace is valid"),
            index: DEFAULT_INDEX.to_string(),
            path: DEFAULT_PATH.to_string(),
            num_candidates: DEFAULT_NUM_CANDIDATES,
            default_limit: DEFAULT_LIMIT,
            fields: default_fields(),
        }
    }
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
}

impl SearchRequest {
    /// Decode and validate a `{query, limit?}` body.
    pub fn parse(body: Option<&str>, default_limit: u32) -> Result<Self> {
        let body = json_object(body)?;

        let query = match body.get("query") {
            Some(Value::String(query)) if !query.trim().is_empty() => query.clone(),
            _ => {
                return Err(ServiceError::Validation(
                    "query parameter is required".to_string(),
                ));
            }
        };

        let limit = match body.get("limit") {
            None | Some(Value::Null) => default_limit,
            Some(value) => value
                .as_u64()
                .filter(|n| *n > 0)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    ServiceError::Validation("limit must be a positive integer".to_string())
                })?,
        };

        Ok(Self { query, limit })
    }
}

/// Build the vector search for an embedded query.
///
/// The candidate pool is never smaller than the limit.
pub fn build_query(settings: &SearchSettings, vector: Vec<f64>, limit: u32) -> VectorSearch {
    VectorSearch::new(vector, limit, settings.num_candidates.max(limit))
        .with_index(settings.index.clone())
        .with_path(settings.path.clone())
        .with_fields(settings.fields.clone())
}

/// Embed the query, run the vector search, return the raw aggregate result.
#[instrument(skip_all, fields(namespace = %settings.namespace))]
pub async fn handle(
    settings: &SearchSettings,
    embedder: &dyn Embedder,
    api: &dyn DataApi,
    body: Option<&str>,
) -> Result<ServiceResponse> {
    let request = SearchRequest::parse(body, settings.default_limit)?;
    info!(query = %request.query, limit = request.limit, "semantic search");

    let vector = embedder.embed(&request.query).await?;
    debug!(dims = vector.len(), model = %embedder.model(), "query embedded");

    let search = build_query(settings, vector, request.limit);
    let result = api
        .execute(&Operation::Aggregate {
            target: settings.namespace.clone(),
            pipeline: search.to_pipeline(),
        })
        .await?;

    Ok(ServiceResponse::ok(result))
}

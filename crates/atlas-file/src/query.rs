//! Filter, update and aggregation evaluation over in-memory documents.
//!
//! Only the subset of the query language the atlas services emit is
//! understood: top-level equality filters (plus `$eq` and `$oid`), `$set`
//! updates, and the `$vectorSearch`, `$project`, `$match` and `$limit`
//! aggregation stages. Anything else is rejected rather than ignored.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use atlas_core::error::{Error, InvalidInputError};
use atlas_core::pipeline::SCORE_META;
use atlas_core::{Result, VectorSearch};

fn unsupported(operator: &str) -> Error {
    InvalidInputError::UnsupportedOperation {
        operation: operator.to_string(),
        reason: "not supported by the file-backed Data API".to_string(),
    }
    .into()
}

fn pipeline_error(reason: impl Into<String>) -> Error {
    InvalidInputError::Pipeline {
        reason: reason.into(),
    }
    .into()
}

// ============================================================================
// Filters
// ============================================================================

/// Check a document against a filter. `null` and `{}` match everything.
pub(crate) fn matches(document: &Value, filter: &Value) -> Result<bool> {
    let conditions = match filter {
        Value::Null => return Ok(true),
        Value::Object(conditions) => conditions,
        _ => {
            return Err(InvalidInputError::Other {
                message: "filter must be a JSON object".to_string(),
            }
            .into());
        }
    };

    for (field, expected) in conditions {
        if field.starts_with('$') {
            return Err(unsupported(field));
        }
        if !field_matches(document.get(field), expected)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn field_matches(actual: Option<&Value>, expected: &Value) -> Result<bool> {
    let Value::Object(spec) = expected else {
        return Ok(actual == Some(expected));
    };

    if !spec.keys().any(|k| k.starts_with('$')) {
        return Ok(actual == Some(expected));
    }

    if spec.len() != 1 {
        return Err(unsupported("compound operator expression"));
    }

    match spec.iter().next() {
        Some((op, value)) if op == "$eq" => Ok(actual == Some(value)),
        // Extended-JSON ObjectId: match the stored id whichever way it was written.
        Some((op, Value::String(oid))) if op == "$oid" => Ok(match actual {
            Some(Value::String(stored)) => stored == oid,
            Some(other) => other == expected,
            None => false,
        }),
        Some((op, _)) => Err(unsupported(op)),
        None => Ok(false),
    }
}

// ============================================================================
// Updates
// ============================================================================

/// Apply a `$set` update in place. Returns true if any field changed.
pub(crate) fn apply_update(document: &mut Value, update: &Value) -> Result<bool> {
    let Value::Object(operators) = update else {
        return Err(InvalidInputError::Other {
            message: "update must be a JSON object".to_string(),
        }
        .into());
    };

    if let Some(op) = operators.keys().find(|k| k.as_str() != "$set") {
        return Err(unsupported(op));
    }

    let Some(Value::Object(fields)) = operators.get("$set") else {
        return Err(InvalidInputError::Other {
            message: "$set must be a JSON object".to_string(),
        }
        .into());
    };

    let Value::Object(target) = document else {
        return Err(InvalidInputError::Other {
            message: "stored document is not a JSON object".to_string(),
        }
        .into());
    };

    if let Some(id) = fields.get("_id")
        && target.get("_id") != Some(id)
    {
        return Err(InvalidInputError::Other {
            message: "_id is immutable".to_string(),
        }
        .into());
    }

    let mut modified = false;
    for (field, value) in fields {
        if target.get(field) != Some(value) {
            target.insert(field.clone(), value.clone());
            modified = true;
        }
    }
    Ok(modified)
}

// ============================================================================
// Aggregation
// ============================================================================

struct Scored {
    document: Value,
    score: Option<f64>,
}

/// Run an aggregate pipeline over a collection's documents.
pub(crate) fn aggregate(documents: Vec<Value>, pipeline: &[Value]) -> Result<Vec<Value>> {
    let mut rows: Vec<Scored> = documents
        .into_iter()
        .map(|document| Scored {
            document,
            score: None,
        })
        .collect();

    for (position, stage) in pipeline.iter().enumerate() {
        let (name, spec) = match stage {
            Value::Object(map) if map.len() == 1 => map
                .iter()
                .next()
                .ok_or_else(|| pipeline_error("empty stage"))?,
            _ => return Err(pipeline_error("each stage must have exactly one operator")),
        };

        rows = match name.as_str() {
            "$vectorSearch" => {
                if position != 0 {
                    return Err(pipeline_error("$vectorSearch must be the first stage"));
                }
                let query = VectorSearch::from_pipeline(std::slice::from_ref(stage))?;
                vector_search(rows, &query)
            }
            "$match" => {
                let mut kept = Vec::with_capacity(rows.len());
                for row in rows {
                    if matches(&row.document, spec)? {
                        kept.push(row);
                    }
                }
                kept
            }
            "$limit" => {
                let limit = spec
                    .as_u64()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| pipeline_error("$limit must be a positive integer"))?;
                rows.into_iter().take(limit as usize).collect()
            }
            "$project" => {
                let Value::Object(projection) = spec else {
                    return Err(pipeline_error("$project must be an object"));
                };
                rows.into_iter()
                    .map(|row| project(row, projection))
                    .collect::<Result<Vec<_>>>()?
            }
            other => return Err(unsupported(other)),
        };
    }

    Ok(rows.into_iter().map(|row| row.document).collect())
}

fn vector_search(rows: Vec<Scored>, query: &VectorSearch) -> Vec<Scored> {
    let mut scored: Vec<Scored> = rows
        .into_iter()
        .filter_map(|row| {
            let embedding = embedding_at(&row.document, &query.path, query.query_vector.len())?;
            let cosine = cosine_similarity(&query.query_vector, &embedding);
            // Cosine scores are normalised to [0, 1] the way Atlas reports them.
            let score = (1.0 + cosine) / 2.0;
            Some(Scored {
                document: row.document,
                score: Some(score),
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
    });

    let keep = query.num_candidates.min(query.limit) as usize;
    scored.truncate(keep);
    scored
}

/// The numeric vector at `path`, if it has `dims` entries.
fn embedding_at(document: &Value, path: &str, dims: usize) -> Option<Vec<f64>> {
    let values = document.get(path)?.as_array()?;
    if values.len() != dims {
        return None;
    }
    values.iter().map(Value::as_f64).collect()
}

fn project(row: Scored, projection: &Map<String, Value>) -> Result<Scored> {
    let Value::Object(source) = row.document else {
        return Err(pipeline_error("$project over a non-object document"));
    };

    let inclusive = projection
        .values()
        .any(|spec| is_truthy(spec) || spec.is_object());

    let mut out = Map::new();
    if inclusive {
        if !projection.get("_id").is_some_and(is_falsy)
            && let Some(id) = source.get("_id")
        {
            out.insert("_id".to_string(), id.clone());
        }

        for (field, spec) in projection {
            if let Some(meta) = spec.get("$meta") {
                if meta.as_str() != Some(SCORE_META) {
                    return Err(unsupported(&format!("$meta {}", meta)));
                }
                let score = row
                    .score
                    .ok_or_else(|| pipeline_error("vectorSearchScore requires $vectorSearch"))?;
                out.insert(field.clone(), Value::from(score));
            } else if is_truthy(spec) {
                if let Some(value) = source.get(field) {
                    out.insert(field.clone(), value.clone());
                }
            } else if !(field == "_id" && is_falsy(spec)) {
                return Err(pipeline_error(format!(
                    "cannot mix inclusion and exclusion of '{}'",
                    field
                )));
            }
        }
    } else {
        out = source;
        for (field, spec) in projection {
            if !is_falsy(spec) {
                return Err(pipeline_error(format!("bad projection for '{}'", field)));
            }
            out.remove(field);
        }
    }

    Ok(Scored {
        document: Value::Object(out),
        score: row.score,
    })
}

fn is_truthy(spec: &Value) -> bool {
    match spec {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn is_falsy(spec: &Value) -> bool {
    match spec {
        Value::Bool(b) => !*b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Cosine similarity between two vectors; 0.0 for mismatched, empty or
/// zero-length inputs.
pub(crate) fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f64::EPSILON {
        return 0.0;
    }

    dot / denom
}

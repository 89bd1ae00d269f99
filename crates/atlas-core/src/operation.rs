//! Data API operations.
//!
//! An [`Operation`] describes one remote call: which endpoint it targets and
//! what payload it carries. It holds no connection state; building one has
//! no side effects.

use serde_json::{Map, Value, json};

use crate::error::{DecodeError, Error};
use crate::types::{ModelId, Namespace};

/// insertOne
pub const INSERT_ONE: &str = "insertOne";

/// find
pub const FIND: &str = "find";

/// findOne
pub const FIND_ONE: &str = "findOne";

/// updateOne
pub const UPDATE_ONE: &str = "updateOne";

/// deleteOne
pub const DELETE_ONE: &str = "deleteOne";

/// aggregate
pub const AGGREGATE: &str = "aggregate";

/// invokeModel
pub const INVOKE_MODEL: &str = "invokeModel";

/// A single remote operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    InsertOne {
        target: Namespace,
        document: Value,
    },
    Find {
        target: Namespace,
        filter: Value,
    },
    FindOne {
        target: Namespace,
        filter: Value,
    },
    UpdateOne {
        target: Namespace,
        filter: Value,
        update: Value,
    },
    DeleteOne {
        target: Namespace,
        filter: Value,
    },
    Aggregate {
        target: Namespace,
        pipeline: Vec<Value>,
    },
    InvokeEmbeddingModel {
        model: ModelId,
        input_text: String,
    },
}

impl Operation {
    /// Returns the endpoint name for this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InsertOne { .. } => INSERT_ONE,
            Operation::Find { .. } => FIND,
            Operation::FindOne { .. } => FIND_ONE,
            Operation::UpdateOne { .. } => UPDATE_ONE,
            Operation::DeleteOne { .. } => DELETE_ONE,
            Operation::Aggregate { .. } => AGGREGATE,
            Operation::InvokeEmbeddingModel { .. } => INVOKE_MODEL,
        }
    }

    /// Returns the database namespace, if this is a Data API operation.
    pub fn target(&self) -> Option<&Namespace> {
        match self {
            Operation::InsertOne { target, .. }
            | Operation::Find { target, .. }
            | Operation::FindOne { target, .. }
            | Operation::UpdateOne { target, .. }
            | Operation::DeleteOne { target, .. }
            | Operation::Aggregate { target, .. } => Some(target),
            Operation::InvokeEmbeddingModel { .. } => None,
        }
    }

    /// Returns true if this operation is served by the Data API.
    pub fn is_data_api(&self) -> bool {
        self.target().is_some()
    }

    /// Build the JSON request body for this operation.
    ///
    /// Data API bodies are `{database, collection, ...}` plus the
    /// operation-specific key; model invocation is `{inputText}`.
    pub fn body(&self) -> Value {
        let mut body = Map::new();

        if let Some(target) = self.target() {
            body.insert("database".into(), json!(target.database()));
            body.insert("collection".into(), json!(target.collection()));
        }

        match self {
            Operation::InsertOne { document, .. } => {
                body.insert("document".into(), document.clone());
            }
            Operation::Find { filter, .. }
            | Operation::FindOne { filter, .. }
            | Operation::DeleteOne { filter, .. } => {
                body.insert("filter".into(), filter.clone());
            }
            Operation::UpdateOne { filter, update, .. } => {
                body.insert("filter".into(), filter.clone());
                body.insert("update".into(), update.clone());
            }
            Operation::Aggregate { pipeline, .. } => {
                body.insert("pipeline".into(), Value::Array(pipeline.clone()));
            }
            Operation::InvokeEmbeddingModel { input_text, .. } => {
                body.insert("inputText".into(), json!(input_text));
            }
        }

        Value::Object(body)
    }
}

// ============================================================================
// Response accessors
// ============================================================================

/// `documents` from a find or aggregate response. Missing means empty.
pub fn documents(response: &Value) -> Result<Vec<Value>, Error> {
    match response.get("documents") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(docs)) => Ok(docs.clone()),
        Some(other) => Err(shape_error(format!(
            "'documents' should be an array, got {}",
            type_name(other)
        ))),
    }
}

/// `document` from a findOne response; `None` when absent or null.
pub fn document(response: &Value) -> Option<Value> {
    match response.get("document") {
        None | Some(Value::Null) => None,
        Some(doc) => Some(doc.clone()),
    }
}

/// `modifiedCount` from an updateOne response, 0 when absent.
pub fn modified_count(response: &Value) -> u64 {
    response
        .get("modifiedCount")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// `deletedCount` from a deleteOne response, 0 when absent.
pub fn deleted_count(response: &Value) -> u64 {
    response
        .get("deletedCount")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// `insertedId` from an insertOne response.
pub fn inserted_id(response: &Value) -> Option<&Value> {
    response.get("insertedId")
}

fn shape_error(message: String) -> Error {
    DecodeError::Shape { message }.into()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! File-backed Data API implementation.

use std::path::Path;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use atlas_core::error::{InvalidInputError, RemoteCallError};
use atlas_core::{ApiUrl, DataApi, Namespace, Operation, Result};

use crate::query::{aggregate, apply_update, matches};
use crate::store::FileStore;

/// Filesystem-backed Data API.
///
/// Answers the six Data API operations with the same response shapes as
/// the hosted service, so services can run against a local directory.
#[derive(Debug, Clone)]
pub struct FileDataApi {
    store: FileStore,
    url: ApiUrl,
}

impl FileDataApi {
    /// Create a new file-backed Data API at the given root directory.
    pub fn new(root: impl AsRef<Path>, url: ApiUrl) -> Self {
        Self {
            store: FileStore::new(root),
            url,
        }
    }

    /// Create a file-backed Data API from a `file://` URL.
    pub fn from_url(url: ApiUrl) -> Result<Self> {
        let root = url.to_file_path().ok_or_else(|| InvalidInputError::ApiUrl {
            value: url.to_string(),
            reason: "file-backed Data API requires a file:// URL".to_string(),
        })?;
        Ok(Self::new(root, url))
    }

    /// Returns the URL for this instance.
    pub fn url(&self) -> &ApiUrl {
        &self.url
    }

    /// Access the underlying file store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    fn insert_one(&self, ns: &Namespace, document: &Value) -> Result<Value> {
        let Value::Object(fields) = document else {
            return Err(InvalidInputError::Other {
                message: "document must be a JSON object".to_string(),
            }
            .into());
        };

        let mut document = fields.clone();
        let id = document
            .entry("_id")
            .or_insert_with(|| Value::String(FileStore::generate_id()))
            .clone();

        self.store.modify(ns, |docs| {
            if docs.iter().any(|d| d.get("_id") == Some(&id)) {
                let body = json!({"error": format!("duplicate key: _id {}", id)});
                return Err(RemoteCallError::new(409, body.to_string()).into());
            }
            docs.push(Value::Object(document));
            Ok(((), true))
        })?;

        debug!(namespace = %ns, id = %id, "inserted document");
        Ok(json!({ "insertedId": id }))
    }

    fn find(&self, ns: &Namespace, filter: &Value) -> Result<Vec<Value>> {
        let mut found = Vec::new();
        for document in self.store.load(ns)? {
            if matches(&document, filter)? {
                found.push(document);
            }
        }
        Ok(found)
    }

    fn find_one(&self, ns: &Namespace, filter: &Value) -> Result<Option<Value>> {
        for document in self.store.load(ns)? {
            if matches(&document, filter)? {
                return Ok(Some(document));
            }
        }
        Ok(None)
    }

    fn update_one(&self, ns: &Namespace, filter: &Value, update: &Value) -> Result<Value> {
        let (matched, modified) = self.store.modify(ns, |docs| {
            for document in docs.iter_mut() {
                if matches(document, filter)? {
                    let modified = apply_update(document, update)?;
                    return Ok(((1u64, u64::from(modified)), modified));
                }
            }
            Ok(((0, 0), false))
        })?;

        debug!(namespace = %ns, matched, modified, "updated document");
        Ok(json!({ "matchedCount": matched, "modifiedCount": modified }))
    }

    fn delete_one(&self, ns: &Namespace, filter: &Value) -> Result<Value> {
        let deleted = self.store.modify(ns, |docs| {
            let mut position = None;
            for (i, document) in docs.iter().enumerate() {
                if matches(document, filter)? {
                    position = Some(i);
                    break;
                }
            }
            match position {
                Some(i) => {
                    docs.remove(i);
                    Ok((1u64, true))
                }
                None => Ok((0, false)),
            }
        })?;

        debug!(namespace = %ns, deleted, "deleted document");
        Ok(json!({ "deletedCount": deleted }))
    }
}

#[async_trait]
impl DataApi for FileDataApi {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    #[instrument(skip(self, operation), fields(op = operation.name()))]
    async fn execute(&self, operation: &Operation) -> Result<Value> {
        match operation {
            Operation::InsertOne { target, document } => self.insert_one(target, document),
            Operation::Find { target, filter } => {
                Ok(json!({ "documents": self.find(target, filter)? }))
            }
            Operation::FindOne { target, filter } => {
                Ok(json!({ "document": self.find_one(target, filter)? }))
            }
            Operation::UpdateOne {
                target,
                filter,
                update,
            } => self.update_one(target, filter, update),
            Operation::DeleteOne { target, filter } => self.delete_one(target, filter),
            Operation::Aggregate { target, pipeline } => {
                let documents = aggregate(self.store.load(target)?, pipeline)?;
                Ok(json!({ "documents": documents }))
            }
            Operation::InvokeEmbeddingModel { .. } => {
                Err(InvalidInputError::UnsupportedOperation {
                    operation: operation.name().to_string(),
                    reason: "not a Data API operation".to_string(),
                }
                .into())
            }
        }
    }
}

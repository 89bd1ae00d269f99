//! Todo documents.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

/// ISO-8601 UTC timestamp as stored on todos.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A new todo as written by `insertOne`.
///
/// `description` holds whatever the client sent when it was truthy,
/// otherwise the empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    pub title: String,
    pub description: Value,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Todo {
    /// A fresh, incomplete todo with both timestamps set to `now`.
    pub fn new(title: impl Into<String>, description: Option<Value>, now: DateTime<Utc>) -> Self {
        let now = timestamp(now);
        Self {
            title: title.into(),
            description: description.unwrap_or_else(|| json!("")),
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn into_document(self) -> Map<String, Value> {
        let mut document = Map::new();
        document.insert("title".into(), json!(self.title));
        document.insert("description".into(), self.description);
        document.insert("completed".into(), json!(self.completed));
        document.insert("created_at".into(), json!(self.created_at));
        document.insert("updated_at".into(), json!(self.updated_at));
        document
    }
}

//! API Gateway proxy event surface.
//!
//! Lets the handlers run on proxy integration events, as they would when
//! deployed behind API Gateway. `atlas invoke` feeds events from files.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{App, ServiceResponse};

/// The subset of a proxy integration event the handlers read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl ProxyEvent {
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.path_parameters
            .get_or_insert_with(HashMap::new)
            .insert("id".to_string(), id.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The `{id}` path parameter, if present.
    pub fn id(&self) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|p| p.get("id"))
            .map(String::as_str)
    }
}

/// A proxy integration response: status, JSON content type, string body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<ServiceResponse> for ProxyResponse {
    fn from(response: ServiceResponse) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: response.status,
            headers,
            body: response.body.to_string(),
        }
    }
}

/// Run the todos handler on a proxy event.
pub async fn todos(app: &App, event: &ProxyEvent) -> ProxyResponse {
    info!(method = %event.http_method, path = %event.path, "processing todos event");
    app.todos(&event.http_method, event.id(), event.body.as_deref())
        .await
        .into()
}

/// Run the search handler on a proxy event. The method is not consulted.
pub async fn search(app: &App, event: &ProxyEvent) -> ProxyResponse {
    info!(path = %event.path, "processing search event");
    app.search(event.body.as_deref()).await.into()
}

//! Data API over signed HTTP.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use atlas_core::error::InvalidInputError;
use atlas_core::{ApiUrl, DataApi, HttpMethod, Operation, Result};

use crate::client::RemoteCallClient;

/// A network-backed Data API reached through API Gateway.
///
/// Every operation is a signed `POST {base}/{operation}` carrying
/// [`Operation::body`].
#[derive(Debug, Clone)]
pub struct HttpDataApi {
    base: ApiUrl,
    client: RemoteCallClient,
}

impl HttpDataApi {
    pub fn new(base: ApiUrl, client: RemoteCallClient) -> Self {
        Self { base, client }
    }

    /// Returns the base URL for this Data API.
    pub fn url(&self) -> &ApiUrl {
        &self.base
    }
}

#[async_trait]
impl DataApi for HttpDataApi {
    fn describe(&self) -> String {
        self.base.to_string()
    }

    #[instrument(skip(self, operation), fields(op = operation.name()))]
    async fn execute(&self, operation: &Operation) -> Result<Value> {
        let Some(target) = operation.target() else {
            return Err(InvalidInputError::UnsupportedOperation {
                operation: operation.name().to_string(),
                reason: "not a Data API operation".to_string(),
            }
            .into());
        };

        debug!(namespace = %target, "calling Data API");
        let url = self.base.endpoint_url(operation.name());
        self.client
            .call(HttpMethod::Post, &url, Some(&operation.body()))
            .await
    }
}

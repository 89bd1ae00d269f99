//! Bedrock embedding model adapter.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use atlas_core::error::{DecodeError, Error, InvalidInputError};
use atlas_core::{ApiUrl, Embedder, HttpMethod, ModelId, Operation, Result};

use crate::client::RemoteCallClient;
use crate::sigv4::uri_encode;

/// Dimensionality of `amazon.titan-embed-text-v1` vectors.
pub const TITAN_V1_DIMS: usize = 1536;

/// Bedrock runtime endpoint for a region.
pub fn runtime_url(region: &str) -> String {
    format!("https://bedrock-runtime.{}.amazonaws.com", region)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvokeModelResponse {
    embedding: Vec<f64>,
    #[serde(default)]
    input_text_token_count: Option<u64>,
}

/// Embeds text by invoking a Bedrock model over signed HTTP.
///
/// The client must sign for the `bedrock` service.
#[derive(Debug, Clone)]
pub struct BedrockEmbedder {
    client: RemoteCallClient,
    runtime: ApiUrl,
    model: ModelId,
    dims: Option<usize>,
}

impl BedrockEmbedder {
    pub fn new(client: RemoteCallClient, runtime: ApiUrl, model: ModelId) -> Self {
        Self {
            client,
            runtime,
            model,
            dims: None,
        }
    }

    /// Reject responses whose vector length differs from `dims`.
    pub fn with_dims(mut self, dims: usize) -> Self {
        self.dims = Some(dims);
        self
    }

    /// The invoke URL, with the model id encoded as one path segment.
    pub fn invoke_url(&self) -> String {
        self.runtime
            .endpoint_url(&format!("model/{}/invoke", uri_encode(self.model.as_str())))
    }
}

#[async_trait]
impl Embedder for BedrockEmbedder {
    fn model(&self) -> &ModelId {
        &self.model
    }

    fn dims(&self) -> Option<usize> {
        self.dims
    }

    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        if text.trim().is_empty() {
            return Err(InvalidInputError::EmptyText.into());
        }

        let operation = Operation::InvokeEmbeddingModel {
            model: self.model.clone(),
            input_text: text.to_string(),
        };

        let value = self
            .client
            .call(HttpMethod::Post, &self.invoke_url(), Some(&operation.body()))
            .await?;

        let response: InvokeModelResponse = serde_json::from_value(value).map_err(|e| {
            Error::Decode(DecodeError::Shape {
                message: format!("model response: {}", e),
            })
        })?;

        if let Some(expected) = self.dims
            && response.embedding.len() != expected
        {
            return Err(DecodeError::Shape {
                message: format!(
                    "expected {} dimensions, model returned {}",
                    expected,
                    response.embedding.len()
                ),
            }
            .into());
        }

        debug!(
            dims = response.embedding.len(),
            tokens = ?response.input_text_token_count,
            "embedding generated"
        );
        Ok(response.embedding)
    }
}

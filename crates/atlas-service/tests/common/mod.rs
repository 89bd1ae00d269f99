use std::sync::Arc;

use async_trait::async_trait;
use atlas_core::error::{Error, RemoteCallError};
use atlas_core::{ApiUrl, DataApi, Embedder, ModelId, Namespace, Operation};
use atlas_file::FileDataApi;
use atlas_service::App;
use serde_json::json;
use tempfile::TempDir;

/// Embeds text onto two axes: beach-like queries along x, everything else along y.
pub struct KeywordEmbedder {
    model: ModelId,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            model: ModelId::default(),
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model(&self) -> &ModelId {
        &self.model
    }

    fn dims(&self) -> Option<usize> {
        Some(2)
    }

    async fn embed(&self, text: &str) -> atlas_core::Result<Vec<f64>> {
        if text.contains("beach") {
            Ok(vec![1.0, 0.0])
        } else {
            Ok(vec![0.0, 1.0])
        }
    }
}

/// Embedder whose model endpoint always fails.
pub struct FailingEmbedder {
    model: ModelId,
}

impl FailingEmbedder {
    pub fn new() -> Self {
        Self {
            model: ModelId::default(),
        }
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model(&self) -> &ModelId {
        &self.model
    }

    fn dims(&self) -> Option<usize> {
        None
    }

    async fn embed(&self, _text: &str) -> atlas_core::Result<Vec<f64>> {
        Err(Error::Remote(RemoteCallError::new(
            400,
            r#"{"message":"Malformed input request"}"#,
        )))
    }
}

pub fn file_api(temp: &TempDir) -> Arc<FileDataApi> {
    let url = ApiUrl::new(format!("file://{}", temp.path().display())).unwrap();
    Arc::new(FileDataApi::from_url(url).unwrap())
}

pub fn app(temp: &TempDir) -> App {
    App::new(file_api(temp), Arc::new(KeywordEmbedder::new()))
}

/// Load two places with embeddings into `travel.asia`.
pub async fn seed_places(api: &dyn DataApi) {
    let asia = Namespace::new("travel", "asia").unwrap();
    let places = [
        json!({"index": 1, "Place Name": "Bali", "details_embedding": [0.9, 0.1]}),
        json!({"index": 2, "Place Name": "Kyoto", "details_embedding": [0.1, 0.9]}),
    ];
    for place in places {
        api.execute(&Operation::InsertOne {
            target: asia.clone(),
            document: place,
        })
        .await
        .unwrap();
    }
}

//! Backend construction from configuration.
//!
//! A `file://` Data API URL selects the file-backed store; anything else
//! is reached over SigV4-signed HTTP.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use atlas_core::{ApiUrl, CredentialProvider, DataApi, Embedder, EnvCredentials, ModelId};
use atlas_file::FileDataApi;
use atlas_http::sigv4::{BEDROCK, EXECUTE_API};
use atlas_http::{BedrockEmbedder, HttpDataApi, RemoteCallClient, SigV4Signer, runtime_url};
use atlas_service::App;

use crate::config::Config;

/// Credentials are read from the environment on every signing call.
fn credentials() -> Arc<dyn CredentialProvider> {
    Arc::new(EnvCredentials)
}

/// A client signing for `service` in the configured region.
pub fn signed_client(config: &Config, service: &str) -> Result<RemoteCallClient> {
    let signer = SigV4Signer::new(credentials(), config.aws.region.clone(), service);
    let timeout = config.data_api.timeout_secs.map(Duration::from_secs);
    RemoteCallClient::with_timeout(Arc::new(signer), timeout).context("Failed to build HTTP client")
}

pub fn data_api(config: &Config) -> Result<Arc<dyn DataApi>> {
    let url = config.data_api.url.as_deref().context(
        "No Data API URL. Set [data_api] url in the config file, --data-api or ATLAS_DATA_API_URL.",
    )?;
    let url = ApiUrl::new(url).context("Invalid Data API URL")?;

    let api: Arc<dyn DataApi> = if url.is_local() {
        Arc::new(FileDataApi::from_url(url).context("Failed to open file-backed Data API")?)
    } else {
        Arc::new(HttpDataApi::new(url, signed_client(config, EXECUTE_API)?))
    };

    debug!(backend = %api.describe(), "Data API selected");
    Ok(api)
}

pub fn embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let runtime = match &config.embedding.runtime_url {
        Some(url) => url.clone(),
        None => runtime_url(&config.aws.region),
    };
    let runtime = ApiUrl::new(&runtime).context("Invalid embedding runtime URL")?;
    let model = ModelId::new(config.embedding.model.clone()).context("Invalid embedding model")?;

    let mut embedder = BedrockEmbedder::new(signed_client(config, BEDROCK)?, runtime, model);
    if let Some(dims) = config.embedding.dims {
        embedder = embedder.with_dims(dims);
    }
    Ok(Arc::new(embedder))
}

/// Handler state for `serve` and `invoke`.
pub fn app(config: &Config) -> Result<App> {
    Ok(App::new(data_api(config)?, embedder(config)?)
        .with_todos(config.todos.settings()?)
        .with_search(config.search.settings()?))
}

/// Base URL and signed client for a deployed service.
pub fn gateway(config: &Config) -> Result<(ApiUrl, RemoteCallClient)> {
    let url = config.gateway.url.as_deref().context(
        "No gateway URL. Set [gateway] url in the config file, --gateway or ATLAS_GATEWAY_URL.",
    )?;
    let url = ApiUrl::new(url).context("Invalid gateway URL")?;
    Ok((url, signed_client(config, EXECUTE_API)?))
}

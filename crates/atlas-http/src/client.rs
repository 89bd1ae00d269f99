//! Signed HTTP client for remote calls.

use std::sync::Arc;
use std::time::Duration;

use atlas_core::error::{DecodeError, Error, InvalidInputError, RemoteCallError, TransportError};
use atlas_core::{HttpMethod, RequestSigner, Result, SignedRequest};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, trace};
use url::Url;

/// Raw status and body of a completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Apply the status rules: 2xx parses as JSON, anything else is a
    /// [`RemoteCallError`] carrying the body.
    pub fn into_json(self) -> Result<Value> {
        if !self.is_success() {
            return Err(RemoteCallError::new(self.status, self.body).into());
        }
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| Error::Decode(DecodeError::from(e)))
    }
}

/// HTTP client that signs every request before sending it.
///
/// One call in, one network request out. There is no retry: a failed
/// `insertOne` retried blindly could write twice.
#[derive(Clone)]
pub struct RemoteCallClient {
    client: reqwest::Client,
    signer: Arc<dyn RequestSigner>,
}

impl RemoteCallClient {
    /// Create a client using the given signer.
    pub fn new(signer: Arc<dyn RequestSigner>) -> Result<Self> {
        Self::with_timeout(signer, None)
    }

    /// Create a client with an overall request timeout.
    pub fn with_timeout(signer: Arc<dyn RequestSigner>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("atlas/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport_error)?;

        Ok(Self { client, signer })
    }

    /// Make a signed call and decode the JSON response.
    ///
    /// The decoded value is returned verbatim.
    #[instrument(skip_all, fields(%method, %url))]
    pub async fn call<B>(&self, method: HttpMethod, url: &str, payload: Option<&B>) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send(method, url, payload).await?;
        if !response.is_success() {
            debug!(status = response.status, "remote call failed");
        }
        response.into_json()
    }

    /// Make a signed call and return the raw status and body.
    pub async fn send<B>(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&B>,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = Url::parse(url).map_err(|e| InvalidInputError::ApiUrl {
            value: url.to_string(),
            reason: e.to_string(),
        })?;

        let body = match payload {
            Some(payload) => serde_json::to_vec(payload).map_err(|e| InvalidInputError::Other {
                message: format!("payload is not serializable: {}", e),
            })?,
            None => Vec::new(),
        };

        let signed = SignedRequest::build(method, url, body, self.signer.as_ref())?;
        self.dispatch(signed).await
    }

    /// Send an already signed request.
    pub async fn dispatch(&self, request: SignedRequest) -> Result<RawResponse> {
        debug!(method = %request.method(), url = %request.url(), "sending signed request");

        let response = self
            .client
            .request(to_reqwest_method(request.method()), request.url().clone())
            .headers(header_map(request.headers())?)
            .body(request.body().to_vec())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        trace!(status, body_len = body.len(), "response received");

        Ok(RawResponse { status, body })
    }
}

impl std::fmt::Debug for RemoteCallClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCallClient").finish_non_exhaustive()
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| InvalidInputError::Other {
            message: format!("invalid header name '{}': {}", name, e),
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| InvalidInputError::Other {
            message: format!("invalid value for header '{}': {}", name, e),
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Classify a reqwest failure.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let kind = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    };
    kind.into()
}

//! Signed request construction.

use std::fmt;

use url::Url;

use crate::Result;
use crate::traits::RequestSigner;

/// Content type sent with every JSON body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP methods used by the Data API, the model endpoint and the todo API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Returns the method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a request a signer is allowed to see.
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
    pub method: HttpMethod,
    pub url: &'a Url,
    /// Headers that will be sent and must be covered by the signature.
    pub headers: &'a [(String, String)],
    pub body: &'a [u8],
}

/// A request with its signature headers attached.
///
/// Built once by [`SignedRequest::build`]; there are no setters, so the
/// signature always matches the method, URL and body it was computed over.
#[derive(Clone)]
pub struct SignedRequest {
    method: HttpMethod,
    url: Url,
    body: Vec<u8>,
    headers: Vec<(String, String)>,
}

impl SignedRequest {
    /// Serialize-ready parts in, signed request out.
    ///
    /// A non-empty body gets a JSON content type header, which is signed
    /// along with everything else.
    pub fn build(
        method: HttpMethod,
        url: Url,
        body: Vec<u8>,
        signer: &dyn RequestSigner,
    ) -> Result<Self> {
        let mut headers = Vec::new();
        if !body.is_empty() {
            headers.push(("content-type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }

        let signature = signer.sign(&RequestParts {
            method,
            url: &url,
            headers: &headers,
            body: &body,
        })?;
        headers.extend(signature);

        Ok(Self {
            method,
            url,
            body,
            headers,
        })
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// All headers to send, including the signature set.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("SignedRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("body_len", &self.body.len())
            .field("headers", &names)
            .finish()
    }
}

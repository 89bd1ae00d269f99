//! Request signing traits.

use crate::credentials::Credentials;
use crate::request::RequestParts;
use crate::Result;

/// Produces credentials for signing.
///
/// Passed explicitly to whatever signs requests; there is no process-wide
/// session.
pub trait CredentialProvider: Send + Sync {
    /// Return the credentials to sign the next request with.
    fn credentials(&self) -> Result<Credentials>;
}

/// Computes the signature header set for a request.
pub trait RequestSigner: Send + Sync {
    /// Return the headers to add so the remote can verify the request.
    fn sign(&self, request: &RequestParts<'_>) -> Result<Vec<(String, String)>>;
}

/// A signer that adds nothing. Used for local endpoints and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsigned;

impl RequestSigner for Unsigned {
    fn sign(&self, _request: &RequestParts<'_>) -> Result<Vec<(String, String)>> {
        Ok(Vec::new())
    }
}

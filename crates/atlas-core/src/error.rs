//! Error types for atlas.
//!
//! This module provides a unified error type with explicit variants for
//! transport, remote-call, decode, credential and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for atlas operations.
///
/// Every remote call either yields a decoded JSON value or exactly one of
/// these variants. Nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The remote endpoint answered with a non-2xx status.
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteCallError),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Credentials could not be obtained or used for signing.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Input validation errors (bad URL, namespace, empty text).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Local I/O failure in a file-backed store.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-2xx answer from the Data API or the model endpoint.
///
/// The body is kept verbatim so callers can log it; it is never returned
/// to end users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCallError {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl RemoteCallError {
    /// Create a new remote call error.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check if the remote rejected the request signature or credentials.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

impl fmt::Display for RemoteCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if !self.body.is_empty() {
            let preview: String = self.body.chars().take(200).collect();
            write!(f, ": {}", preview)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteCallError {}

/// Response decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body was not valid JSON.
    #[error("invalid JSON: {message}")]
    Json { message: String },

    /// JSON was valid but a required field was missing or mistyped.
    #[error("unexpected response shape: {message}")]
    Shape { message: String },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json {
            message: err.to_string(),
        }
    }
}

/// Credential and signing errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required credential environment variable is not set.
    #[error("missing credential: {name} is not set")]
    MissingCredential { name: String },

    /// The request could not be signed.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid database or collection name.
    #[error("invalid namespace '{value}': {reason}")]
    Namespace { value: String, reason: String },

    /// Invalid model identifier.
    #[error("invalid model id '{value}': {reason}")]
    ModelId { value: String, reason: String },

    /// Embedding input text was empty.
    #[error("embedding input text must not be empty")]
    EmptyText,

    /// The backend does not handle this operation.
    #[error("unsupported operation '{operation}': {reason}")]
    UnsupportedOperation { operation: String, reason: String },

    /// A pipeline could not be parsed.
    #[error("invalid pipeline: {reason}")]
    Pipeline { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

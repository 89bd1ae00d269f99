//! Service error type and its HTTP status mapping.

use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::response::ServiceResponse;

/// Body returned for every 500; details go to the log only.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors raised while handling one request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was rejected before any remote call.
    #[error("{0}")]
    Validation(String),

    /// The addressed document does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The HTTP method is not handled by this resource.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A Data API or embedding call failed.
    #[error("backend call failed: {0}")]
    Backend(#[from] atlas_core::Error),

    /// Any other failure, such as an unreadable request body.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::MethodNotAllowed => 405,
            ServiceError::Backend(_) | ServiceError::Internal(_) => 500,
        }
    }

    /// Render as a `{error}` response. Server errors are logged and answered
    /// with a generic message.
    pub fn into_response(self) -> ServiceResponse {
        let status = self.status();
        let message = if status >= 500 {
            error!(error = %self, "request failed");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        ServiceResponse::new(status, json!({ "error": message }))
    }
}

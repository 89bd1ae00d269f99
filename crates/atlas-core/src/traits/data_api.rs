//! Data API trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::operation::Operation;
use crate::Result;

/// A backend that executes Data API operations.
///
/// Implementations return the response JSON verbatim; interpreting
/// `insertedId`, `documents`, `modifiedCount` and friends is up to the
/// caller (see [`crate::operation`] accessors).
#[async_trait]
pub trait DataApi: Send + Sync {
    /// Short description of where operations go, for logging.
    fn describe(&self) -> String;

    /// Execute a single operation.
    async fn execute(&self, operation: &Operation) -> Result<Value>;
}

//! Embedding generation trait.

use async_trait::async_trait;

use crate::types::ModelId;
use crate::Result;

/// Turns text into a fixed-length vector using a remote model.
///
/// Failures are always returned as errors; implementations never
/// substitute a placeholder vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model this embedder invokes.
    fn model(&self) -> &ModelId;

    /// Returns the expected dimensionality, if known.
    fn dims(&self) -> Option<usize>;

    /// Embed a single non-empty text.
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;
}

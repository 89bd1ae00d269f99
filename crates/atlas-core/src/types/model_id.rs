//! Embedding model identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Identifier of a remote embedding model, e.g. `amazon.titan-embed-text-v1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelId(String);

impl ModelId {
    /// The Titan text embedding model used by the search service.
    pub const TITAN_EMBED_TEXT_V1: &'static str = "amazon.titan-embed-text-v1";

    /// Create a model id, rejecting empty or whitespace-bearing values.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidInputError::ModelId {
                value: s,
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if s.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(InvalidInputError::ModelId {
                value: s,
                reason: "must not contain whitespace or '/'".to_string(),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self(Self::TITAN_EMBED_TEXT_V1.to_string())
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ModelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ModelId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

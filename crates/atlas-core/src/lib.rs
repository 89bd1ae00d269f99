//! atlas-core - Core types and traits for signed Data API calls.

pub mod credentials;
pub mod error;
pub mod operation;
pub mod pipeline;
pub mod request;
pub mod traits;
pub mod types;

pub use credentials::{Credentials, EnvCredentials, StaticCredentials};
pub use error::Error;
pub use operation::Operation;
pub use pipeline::VectorSearch;
pub use request::{HttpMethod, SignedRequest};
pub use traits::{CredentialProvider, DataApi, Embedder, RequestSigner, Unsigned};
pub use types::{ApiUrl, ModelId, Namespace, Todo};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

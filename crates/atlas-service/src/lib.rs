//! atlas-service - Todo CRUD, semantic search and CSV import over the Data API.
//!
//! Handlers are plain async functions over [`atlas_core::DataApi`] and
//! [`atlas_core::Embedder`]. They can be driven by API Gateway proxy events
//! ([`lambda`]) or served over HTTP ([`router`]).

mod app;
mod body;
mod error;
pub mod import;
pub mod lambda;
mod response;
pub mod router;
pub mod search;
pub mod todos;

pub use app::App;
pub use error::ServiceError;
pub use import::{ImportError, ImportSummary, RowShaper};
pub use lambda::{ProxyEvent, ProxyResponse};
pub use response::ServiceResponse;
pub use search::SearchSettings;
pub use todos::{IdStrategy, TodoSettings};

/// Result type alias for service handlers.
pub type Result<T> = std::result::Result<T, ServiceError>;

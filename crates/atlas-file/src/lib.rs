//! atlas-file - Filesystem-backed Data API implementation.

mod api;
mod query;
mod store;

pub use api::FileDataApi;
pub use store::FileStore;

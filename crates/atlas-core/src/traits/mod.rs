//! Core traits at the seams between services and transports.

mod data_api;
mod embedder;
mod signer;

pub use data_api::DataApi;
pub use embedder::Embedder;
pub use signer::{CredentialProvider, RequestSigner, Unsigned};

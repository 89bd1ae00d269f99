//! atlas-http - Signed remote calls to the Data API and Bedrock.

mod bedrock;
mod client;
mod data_api;
pub mod sigv4;

pub use bedrock::{BedrockEmbedder, TITAN_V1_DIMS, runtime_url};
pub use client::{RawResponse, RemoteCallClient};
pub use data_api::HttpDataApi;
pub use sigv4::SigV4Signer;

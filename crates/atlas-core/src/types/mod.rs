//! Core atlas types.
//!
//! These types enforce their invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod api_url;
mod model_id;
mod namespace;
mod todo;

pub use api_url::ApiUrl;
pub use model_id::ModelId;
pub use namespace::Namespace;
pub use todo::{Todo, timestamp};

//! Validated value types.
//!
//! These types enforce their invariants at construction time,
//! so request paths and base URLs are always well formed.

mod api_url;
mod movie_id;

pub use api_url::ApiUrl;
pub use movie_id::MovieId;

//! Collaborator traits for the auth service and durable storage.

mod auth;
mod storage;

pub use auth::AuthApi;
pub use storage::SessionStorage;

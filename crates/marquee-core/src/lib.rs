//! marquee-core - Core types, session store and traits for the marquee
//! movie catalog client.
//!
//! The [`TokenStore`] owns the session. HTTP-backed implementations of
//! [`AuthApi`] and the authenticated client live in `marquee-http`; a
//! file-backed [`SessionStorage`] lives in `marquee-file`.

pub mod credentials;
pub mod error;
mod lenient;
pub mod memory;
pub mod movie;
pub mod pagination;
pub mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod trailer;
pub mod types;

pub use credentials::{Credentials, Registration};
pub use error::Error;
pub use memory::MemoryStorage;
pub use movie::{Movie, MovieFilters, MoviePatch, MoviePayload, MoviesPage, MoviesQuery};
pub use session::{AuthGrant, AuthState, Identity, Session};
pub use store::TokenStore;
pub use tokens::{AccessToken, RefreshToken, TokenPair};
pub use traits::{AuthApi, SessionStorage};
pub use types::{ApiUrl, MovieId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

//! marquee-http - reqwest-backed client for the marquee movie catalog API.
//!
//! [`AuthenticatedClient`] is the entry point for authenticated calls: it
//! stamps requests with the session's access token and coordinates a single
//! token refresh when the backend rejects them. The services wrap it.

mod auth;
mod authed;
mod cache;
mod client;
pub mod endpoints;
mod movies;
mod upload;

pub use auth::HttpAuthApi;
pub use authed::AuthenticatedClient;
pub use cache::{MOVIE_TTL, MovieCache};
pub use client::{
    ApiRequest, ApiResponse, ClientConfig, HttpClient, ImageUpload, PASSTHROUGH_HEADER,
};
pub use movies::MoviesService;
pub use upload::{IMAGE_FIELD, UploadService};

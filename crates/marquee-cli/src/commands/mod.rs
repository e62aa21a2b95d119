//! Subcommand implementations.

pub mod auth;
pub mod movies;
pub mod trailer;
pub mod upload;

//! marquee-file - Filesystem-backed session storage.

mod store;

pub use store::{FileStorage, SESSION_FILE};

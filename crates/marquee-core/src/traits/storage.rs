//! Durable client storage trait.

use crate::Result;

/// A string key/value store that survives process restarts.
///
/// The token store writes the session through to this storage on every
/// login, refresh and logout. Operations are synchronous so that logout
/// can clear durable state without yielding.
pub trait SessionStorage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

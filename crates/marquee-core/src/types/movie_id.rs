//! Movie identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// The backend-assigned identifier of a movie.
///
/// Ids are opaque strings but are interpolated into request paths, so they
/// must be non-empty and free of path separators and whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MovieId(String);

impl MovieId {
    /// Create a new movie id, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidInputError::MovieId {
                value: s,
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if s.chars()
            .any(|c| c == '/' || c == '?' || c == '#' || c.is_whitespace())
        {
            return Err(InvalidInputError::MovieId {
                value: s,
                reason: "must not contain '/', '?', '#' or whitespace".to_string(),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MovieId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Some backends emit numeric ids.
        let value = serde_json::Value::deserialize(deserializer)?;
        let s = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected string or number id, got {other}"
                )));
            }
        };
        MovieId::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid_like_ids() {
        let id = MovieId::new("3f2c9a1e-7b7d-4c1a-9d0e-2f1a3b4c5d6e").unwrap();
        assert_eq!(id.as_str(), "3f2c9a1e-7b7d-4c1a-9d0e-2f1a3b4c5d6e");
    }

    #[test]
    fn rejects_empty_and_path_like_ids() {
        assert!(MovieId::new("").is_err());
        assert!(MovieId::new("../admin").is_err());
        assert!(MovieId::new("a b").is_err());
    }

    #[test]
    fn deserializes_numeric_ids() {
        let id: MovieId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");
        let id: MovieId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.as_str(), "abc");
    }
}

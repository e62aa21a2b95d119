//! Error types for the marquee toolkit.
//!
//! One error type covers every failure the client can surface. The variants
//! map onto the recovery policy of the authenticated client: only
//! [`AuthError::Unauthorized`] is recovered locally (by a token refresh),
//! everything else propagates to the caller unchanged.

use std::fmt;
use thiserror::Error;

/// The unified error type for marquee operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (rejected token, missing session, bad credentials).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The token refresh itself failed. The session has been cleared.
    #[error("session refresh failed: {source}")]
    Refresh {
        #[source]
        source: Box<Error>,
    },

    /// Non-2xx responses that are not authorization failures.
    #[error("server error: {0}")]
    Server(ApiError),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(#[from] DecodeError),

    /// Input validation errors (URL, id, date formats).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Durable session storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Wrap an error raised while refreshing the session.
    pub fn refresh(source: Error) -> Self {
        Error::Refresh {
            source: Box::new(source),
        }
    }

    /// Classify a failed API response: 401/403 are authorization failures,
    /// everything else is a server failure.
    pub fn from_status(error: ApiError) -> Self {
        if error.is_auth_failure() {
            Error::Auth(AuthError::Unauthorized(error))
        } else {
            Error::Server(error)
        }
    }

    /// Returns true if this is a 401/403 authorization failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Auth(AuthError::Unauthorized(_)))
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth(AuthError::Unauthorized(e)) | Error::Server(e) => Some(e.status),
            Error::Refresh { source } => source.status(),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server rejected the request with 401 or 403.
    #[error("unauthorized: {0}")]
    Unauthorized(ApiError),

    /// No session is held, so the request cannot be authenticated.
    #[error("not authenticated")]
    NotAuthenticated,

    /// No refresh token is held, so the session cannot be refreshed.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The auth service answered but reported failure.
    #[error("{message}")]
    Rejected {
        message: String,
        errors: Vec<FieldError>,
    },
}

/// A field-level validation message reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct FieldError {
    /// The offending field, if the backend names one.
    #[serde(default)]
    pub field: Option<String>,
    /// Human-readable message.
    pub message: String,
}

/// A non-2xx response from the backend.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Error message from the server, if the body carried one.
    pub message: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// 401 and 403 both trigger the refresh protocol.
    pub fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Errors decoding a response body.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body was not valid JSON for the expected type.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was missing from the body.
    #[error("missing field '{0}'")]
    MissingField(&'static str),
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid movie id.
    #[error("invalid movie id '{value}': {reason}")]
    MovieId { value: String, reason: String },

    /// Invalid calendar date.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    Date { value: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Durable storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store held data that could not be parsed.
    #[error("corrupt storage: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_401_and_403_as_auth_failures() {
        for status in [401, 403] {
            let err = Error::from_status(ApiError::new(status, None));
            assert!(err.is_auth_failure());
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn other_statuses_are_server_failures() {
        for status in [400, 404, 500, 503] {
            let err = Error::from_status(ApiError::new(status, Some("nope".into())));
            assert!(matches!(err, Error::Server(_)));
            assert!(!err.is_auth_failure());
        }
    }

    #[test]
    fn api_error_display_includes_message() {
        let err = ApiError::new(422, Some("title is required".into()));
        assert_eq!(err.to_string(), "HTTP 422: title is required");
        assert_eq!(ApiError::new(500, None).to_string(), "HTTP 500");
    }

    #[test]
    fn refresh_error_keeps_source_status() {
        let err = Error::refresh(Error::from_status(ApiError::new(401, None)));
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_auth_failure());
    }
}

//! Session data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tokens::{AccessToken, RefreshToken, TokenPair};

/// The authenticated user's identity, as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A successful login, registration or refresh.
///
/// Refresh responses may omit the user; the store then keeps the identity
/// it already holds.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub user: Option<Identity>,
    pub tokens: TokenPair,
}

/// The current session: tokens plus the identity they belong to.
///
/// Every field is `None` after logout or an unrecoverable refresh failure.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
    pub user: Option<Identity>,
}

impl Session {
    /// Build a session from a grant.
    pub fn from_grant(grant: AuthGrant) -> Self {
        Self {
            access_token: Some(grant.tokens.access_token),
            refresh_token: Some(grant.tokens.refresh_token),
            user: grant.user,
        }
    }

    /// A session is authenticated when it holds an access token and a user.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    /// Returns true if every field is empty.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

/// The observable part of the session, broadcast to subscribers and
/// persisted under [`AUTH_STATE_KEY`](crate::store::AUTH_STATE_KEY).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<Identity>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl From<&Session> for AuthState {
    fn from(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            is_authenticated: session.is_authenticated(),
        }
    }
}

//! Auth service trait.

use async_trait::async_trait;

use crate::session::AuthGrant;
use crate::{Credentials, RefreshToken, Registration, Result};

/// The external auth service that issues token pairs.
///
/// Every operation either yields a fresh [`AuthGrant`] or fails; the
/// [`TokenStore`](crate::TokenStore) decides what to do with either outcome.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Create an account and sign it in.
    async fn register(&self, registration: &Registration) -> Result<AuthGrant>;

    /// Exchange credentials for a token pair.
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant>;

    /// Exchange a refresh token for a new token pair.
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<AuthGrant>;
}

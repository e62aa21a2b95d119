//! The auth service over HTTP.

use async_trait::async_trait;
use tracing::{debug, instrument};

use marquee_core::error::{AuthError, DecodeError};
use marquee_core::{AuthApi, AuthGrant, Credentials, RefreshToken, Registration, Result, TokenPair};

use crate::client::{ApiRequest, HttpClient};
use crate::endpoints::{
    AUTH_LOGIN, AUTH_REFRESH, AUTH_REGISTER, AuthEnvelope, LoginRequest, RefreshRequest,
    RegisterRequest,
};

/// [`AuthApi`] backed by the REST backend's `/auth` routes.
///
/// These calls are never routed through the authenticated client: they
/// carry no bearer token and a rejected refresh must not trigger another
/// refresh.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: HttpClient,
}

impl HttpAuthApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    async fn call(&self, request: ApiRequest, requires_user: bool) -> Result<AuthGrant> {
        let response = self.client.execute(&request, None).await?;
        let envelope: AuthEnvelope = response.json()?;

        let data = match envelope.data {
            Some(data) if envelope.success != Some(false) => data,
            _ => {
                return Err(AuthError::Rejected {
                    message: envelope
                        .message
                        .unwrap_or_else(|| "authentication failed".to_string()),
                    errors: envelope.errors,
                }
                .into());
            }
        };

        if requires_user && data.user.is_none() {
            return Err(DecodeError::MissingField("data.user").into());
        }

        Ok(AuthGrant {
            user: data.user,
            tokens: TokenPair::new(data.tokens.access_token, data.tokens.refresh_token),
        })
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    #[instrument(skip(self, registration), fields(email = %registration.email()))]
    async fn register(&self, registration: &Registration) -> Result<AuthGrant> {
        debug!("Registering via HTTP");
        let request = ApiRequest::post(AUTH_REGISTER).json(&RegisterRequest {
            name: registration.name(),
            email: registration.email(),
            password: registration.password(),
        })?;
        self.call(request, true).await
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant> {
        debug!("Logging in via HTTP");
        let request = ApiRequest::post(AUTH_LOGIN).json(&LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        })?;
        self.call(request, true).await
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<AuthGrant> {
        debug!("Refreshing via HTTP");
        let request = ApiRequest::post(AUTH_REFRESH).json(&RefreshRequest {
            refresh_token: refresh_token.as_str(),
        })?;
        self.call(request, false).await
    }
}

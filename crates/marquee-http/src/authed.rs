//! Authenticated client with single-flight token refresh.
//!
//! Every request is stamped with the access token the [`TokenStore`] holds
//! at send time. When the backend answers 401 or 403 the client runs at most
//! one refresh at a time:
//!
//! - the first failing request moves the client from idle to refreshing and
//!   calls [`TokenStore::refresh`];
//! - requests that fail while the refresh is outstanding park a oneshot
//!   receiver in the pending queue instead of refreshing again;
//! - when the refresh settles, every parked request receives the new token
//!   (and is replayed once) or `None` (and returns its original 401/403).
//!
//! A replayed request is never replayed again, whatever it returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use marquee_core::{AccessToken, Error, Result, TokenStore};

use crate::client::{ApiRequest, ApiResponse, HttpClient};

/// A request parked until the in-flight refresh settles.
type Pending = oneshot::Sender<Option<AccessToken>>;

enum RefreshState {
    Idle,
    Refreshing { pending: Vec<Pending> },
}

/// What a request that hit 401/403 should do next.
enum Recovery {
    /// Start the refresh.
    Refresh,
    /// Wait for the refresh another request started.
    Wait(oneshot::Receiver<Option<AccessToken>>),
    /// A refresh finished after this request was stamped; replay with its token.
    Replay(AccessToken),
    /// The session was torn down after this request was stamped.
    GiveUp,
}

/// HTTP client that injects bearer tokens and recovers from expired ones.
///
/// Cheap to clone; clones share the token store and the refresh state.
#[derive(Clone)]
pub struct AuthenticatedClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    store: TokenStore,
    state: Mutex<RefreshState>,
}

impl AuthenticatedClient {
    /// Create a client over `http` that draws tokens from `store`.
    pub fn new(http: HttpClient, store: TokenStore) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                store,
                state: Mutex::new(RefreshState::Idle),
            }),
        }
    }

    /// The session this client authenticates with.
    pub fn store(&self) -> &TokenStore {
        &self.inner.store
    }

    /// The underlying unauthenticated client.
    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// Returns true while a refresh is outstanding.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.inner.lock_state(), RefreshState::Refreshing { .. })
    }

    /// Send a request, refreshing the session once if it is rejected.
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`] if the request is rejected again after a refresh,
    ///   or was queued behind a refresh that failed
    /// - [`Error::Refresh`] if this request started a refresh that failed;
    ///   the session has been cleared
    /// - [`Error::Transport`] / [`Error::Server`] unchanged from the backend
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let stamped = self.inner.store.access_token();

        match self.inner.http.execute(request, stamped.as_ref()).await {
            Err(failure) if failure.is_auth_failure() => {
                self.recover(request, stamped, failure).await
            }
            outcome => outcome,
        }
    }

    async fn recover(
        &self,
        request: &ApiRequest,
        stamped: Option<AccessToken>,
        failure: Error,
    ) -> Result<ApiResponse> {
        match self.inner.plan(&stamped) {
            Recovery::Refresh => self.refresh_and_replay(request, failure).await,
            Recovery::Wait(rx) => {
                debug!("Refresh in flight, queueing request");
                match rx.await {
                    Ok(Some(token)) => self.replay(request, token).await,
                    _ => Err(failure),
                }
            }
            Recovery::Replay(token) => {
                debug!("Token was refreshed while request was in flight");
                self.replay(request, token).await
            }
            Recovery::GiveUp => Err(failure),
        }
    }

    async fn refresh_and_replay(
        &self,
        request: &ApiRequest,
        failure: Error,
    ) -> Result<ApiResponse> {
        info!("Access token rejected, refreshing session");
        let mut in_flight = InFlight {
            inner: self.inner.as_ref(),
            token: None,
        };

        // On failure the store has already cleared the session.
        let session = self.inner.store.refresh().await?;

        let Some(token) = session.access_token else {
            warn!("Refresh succeeded without an access token");
            return Err(failure);
        };
        in_flight.token = Some(token.clone());
        drop(in_flight);

        self.replay(request, token).await
    }

    /// Send the request a second and final time.
    async fn replay(&self, request: &ApiRequest, token: AccessToken) -> Result<ApiResponse> {
        let outcome = self.inner.http.execute(request, Some(&token)).await;
        if let Err(ref e) = outcome
            && e.is_auth_failure()
        {
            warn!("Request rejected again after refresh");
        }
        outcome
    }
}

impl ClientInner {
    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide how to recover, atomically with respect to other requests.
    fn plan(&self, stamped: &Option<AccessToken>) -> Recovery {
        let mut state = self.lock_state();
        match &mut *state {
            RefreshState::Refreshing { pending } => {
                let (tx, rx) = oneshot::channel();
                pending.push(tx);
                Recovery::Wait(rx)
            }
            RefreshState::Idle => {
                let current = self.store.access_token();
                if current != *stamped {
                    return match current {
                        Some(token) => Recovery::Replay(token),
                        None => Recovery::GiveUp,
                    };
                }
                *state = RefreshState::Refreshing {
                    pending: Vec::new(),
                };
                Recovery::Refresh
            }
        }
    }

    /// Return to idle and hand the outcome to every parked request.
    fn release(&self, token: Option<AccessToken>) {
        let pending = match std::mem::replace(&mut *self.lock_state(), RefreshState::Idle) {
            RefreshState::Refreshing { pending } => pending,
            RefreshState::Idle => Vec::new(),
        };
        debug!(
            pending = pending.len(),
            refreshed = token.is_some(),
            "Releasing queued requests"
        );
        for tx in pending {
            let _ = tx.send(token.clone());
        }
    }
}

/// Ownership of the refreshing state. Dropping it releases the queue, so a
/// cancelled refresh fails its waiters instead of stranding them.
struct InFlight<'a> {
    inner: &'a ClientInner,
    token: Option<AccessToken>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.inner.release(self.token.take());
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base_url", self.inner.http.base_url())
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}

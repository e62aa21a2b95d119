//! The token store: single owner of the session.
//!
//! The store is the only place session tokens are mutated. It is cheap to
//! clone and is injected into the authenticated client at construction;
//! the client reads the current access token from it at send time.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, Error, StorageError};
use crate::session::{AuthGrant, AuthState, Identity, Session};
use crate::tokens::{AccessToken, RefreshToken};
use crate::traits::{AuthApi, SessionStorage};
use crate::{Credentials, Registration, Result};

/// Storage key for the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key for the persisted [`AuthState`] document.
pub const AUTH_STATE_KEY: &str = "auth-storage";

/// Holds the current session and writes it through to durable storage.
///
/// # Example
///
/// ```ignore
/// let store = TokenStore::restore(auth, storage)?;
/// if !store.is_authenticated() {
///     store.login(&Credentials::new("ana@example.com", "hunter22")).await?;
/// }
/// ```
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    auth: Arc<dyn AuthApi>,
    storage: Arc<dyn SessionStorage>,
    session: RwLock<Session>,
    last_error: RwLock<Option<String>>,
    state: watch::Sender<AuthState>,
}

impl TokenStore {
    /// Create a store with an empty session.
    pub fn new(auth: Arc<dyn AuthApi>, storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_session(auth, storage, Session::default())
    }

    /// Create a store from whatever session durable storage holds.
    ///
    /// The session is restored only if an access token and a user were
    /// both persisted and the persisted state says authenticated. Anything
    /// less restores an empty session.
    pub fn restore(auth: Arc<dyn AuthApi>, storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let access_token = storage.get(ACCESS_TOKEN_KEY)?.map(AccessToken::new);
        let refresh_token = storage.get(REFRESH_TOKEN_KEY)?.map(RefreshToken::new);

        let state = match storage.get(AUTH_STATE_KEY)? {
            Some(json) => serde_json::from_str::<AuthState>(&json).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring unreadable persisted auth state");
                AuthState::default()
            }),
            None => AuthState::default(),
        };

        let session = match (access_token, state.user) {
            (Some(access_token), Some(user)) if state.is_authenticated => Session {
                access_token: Some(access_token),
                refresh_token,
                user: Some(user),
            },
            _ => {
                debug!("No restorable session in storage");
                Session::default()
            }
        };

        if session.is_authenticated() {
            info!("Restored persisted session");
        }

        Ok(Self::with_session(auth, storage, session))
    }

    fn with_session(
        auth: Arc<dyn AuthApi>,
        storage: Arc<dyn SessionStorage>,
        session: Session,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::from(&session));
        Self {
            inner: Arc::new(StoreInner {
                auth,
                storage,
                session: RwLock::new(session),
                last_error: RwLock::new(None),
                state,
            }),
        }
    }

    /// Sign in. On failure the error state is set and any prior session is
    /// left untouched.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        info!("Logging in");
        let outcome = self.inner.auth.login(credentials).await;
        self.settle(outcome)
    }

    /// Create an account and sign in. Same state rules as [`login`](Self::login).
    #[instrument(skip(self, registration), fields(email = %registration.email()))]
    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        info!("Registering account");
        let outcome = self.inner.auth.register(registration).await;
        self.settle(outcome)
    }

    fn settle(&self, outcome: Result<AuthGrant>) -> Result<Session> {
        match outcome.and_then(|grant| self.install(grant)) {
            Ok(session) => {
                self.set_error(None);
                debug!("Session established");
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Authentication failed");
                self.set_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Exchange the refresh token for a new token pair.
    ///
    /// On success both tokens are replaced. On failure the session is
    /// cleared and the cause is returned wrapped in [`Error::Refresh`].
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Session> {
        info!("Refreshing session");

        let outcome = match self.refresh_token() {
            Some(refresh_token) => self.inner.auth.refresh(&refresh_token).await,
            None => Err(AuthError::NoRefreshToken.into()),
        };

        match outcome.and_then(|grant| self.install(grant)) {
            Ok(session) => {
                debug!("Session refreshed successfully");
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed, logging out");
                self.logout();
                Err(Error::refresh(e))
            }
        }
    }

    /// Clear tokens and identity, in memory and in durable storage.
    ///
    /// Never touches the network. Storage failures are logged, not returned.
    pub fn logout(&self) {
        info!("Logging out");
        let session = Session::default();
        if let Err(e) = self.persist(&session) {
            warn!(error = %e, "Failed to clear persisted session");
        }
        *self.write_session() = session;
        self.broadcast();
    }

    fn install(&self, grant: AuthGrant) -> Result<Session> {
        let mut session = Session::from_grant(grant);
        if session.user.is_none() {
            session.user = self.read_session().user.clone();
        }

        self.persist(&session)?;
        *self.write_session() = session.clone();
        self.broadcast();
        Ok(session)
    }

    fn persist(&self, session: &Session) -> Result<()> {
        let storage = &self.inner.storage;

        match &session.access_token {
            Some(token) => storage.set(ACCESS_TOKEN_KEY, token.as_str())?,
            None => storage.remove(ACCESS_TOKEN_KEY)?,
        }
        match &session.refresh_token {
            Some(token) => storage.set(REFRESH_TOKEN_KEY, token.as_str())?,
            None => storage.remove(REFRESH_TOKEN_KEY)?,
        }

        let state =
            serde_json::to_string(&AuthState::from(session)).map_err(StorageError::Corrupt)?;
        storage.set(AUTH_STATE_KEY, &state)
    }

    fn broadcast(&self) {
        let state = AuthState::from(&*self.read_session());
        self.inner.state.send_replace(state);
    }

    fn read_session(&self) -> RwLockReadGuard<'_, Session> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_session(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_error(&self, error: Option<String>) {
        *self
            .inner
            .last_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = error;
    }

    /// Snapshot of the current access token.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.read_session().access_token.clone()
    }

    /// Snapshot of the current refresh token.
    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.read_session().refresh_token.clone()
    }

    /// Snapshot of the current user.
    pub fn user(&self) -> Option<Identity> {
        self.read_session().user.clone()
    }

    /// Snapshot of the whole session.
    pub fn session(&self) -> Session {
        self.read_session().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_session().is_authenticated()
    }

    /// The message of the last failed login or registration, if any.
    pub fn last_error(&self) -> Option<String> {
        self.inner
            .last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_error(&self) {
        self.set_error(None);
    }

    /// Watch the observable auth state.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.read_session();
        f.debug_struct("TokenStore")
            .field("user", &session.user)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::ApiError;
    use crate::memory::MemoryStorage;
    use crate::tokens::TokenPair;

    /// Auth service that replays scripted outcomes.
    #[derive(Default)]
    struct ScriptedAuth {
        outcomes: Mutex<VecDeque<Result<AuthGrant>>>,
        refresh_calls: AtomicUsize,
    }

    impl ScriptedAuth {
        fn push(&self, outcome: Result<AuthGrant>) {
            self.outcomes.lock().unwrap().push_back(outcome);
        }

        fn next(&self) -> Result<AuthGrant> {
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted outcome left")
        }
    }

    #[async_trait]
    impl AuthApi for ScriptedAuth {
        async fn register(&self, _registration: &Registration) -> Result<AuthGrant> {
            self.next()
        }

        async fn login(&self, _credentials: &Credentials) -> Result<AuthGrant> {
            self.next()
        }

        async fn refresh(&self, _refresh_token: &RefreshToken) -> Result<AuthGrant> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            self.next()
        }
    }

    fn ana() -> Identity {
        Identity {
            id: "u1".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            created_at: None,
        }
    }

    fn grant(access: &str, refresh: &str) -> AuthGrant {
        AuthGrant {
            user: Some(ana()),
            tokens: TokenPair::new(access, refresh),
        }
    }

    fn rejected() -> Error {
        AuthError::Rejected {
            message: "Invalid email or password".into(),
            errors: Vec::new(),
        }
        .into()
    }

    fn setup() -> (Arc<ScriptedAuth>, Arc<MemoryStorage>, TokenStore) {
        let auth = Arc::new(ScriptedAuth::default());
        let storage = Arc::new(MemoryStorage::new());
        let store = TokenStore::new(auth.clone(), storage.clone());
        (auth, storage, store)
    }

    #[tokio::test]
    async fn login_writes_tokens_through_to_storage() {
        let (auth, storage, store) = setup();
        auth.push(Ok(grant("access-1", "refresh-1")));

        let session = store
            .login(&Credentials::new("ana@example.com", "pw"))
            .await
            .unwrap();

        assert!(session.is_authenticated());
        assert_eq!(
            storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("access-1")
        );
        assert_eq!(
            storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(),
            Some("refresh-1")
        );

        let state: AuthState =
            serde_json::from_str(&storage.get(AUTH_STATE_KEY).unwrap().unwrap()).unwrap();
        assert!(state.is_authenticated);
        assert_eq!(state.user, Some(ana()));
    }

    #[tokio::test]
    async fn failed_login_sets_error_and_keeps_prior_session() {
        let (auth, storage, store) = setup();
        auth.push(Ok(grant("access-1", "refresh-1")));
        auth.push(Err(rejected()));

        let creds = Credentials::new("ana@example.com", "pw");
        store.login(&creds).await.unwrap();
        assert!(store.login(&creds).await.is_err());

        assert_eq!(
            store.last_error().as_deref(),
            Some("authentication error: Invalid email or password")
        );
        assert_eq!(store.access_token().unwrap().as_str(), "access-1");
        assert_eq!(
            storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("access-1")
        );

        store.clear_error();
        assert!(store.last_error().is_none());
    }

    #[tokio::test]
    async fn register_establishes_session() {
        let (auth, _storage, store) = setup();
        auth.push(Ok(grant("access-1", "refresh-1")));

        store
            .register(&Registration::new("Ana", "ana@example.com", "pw"))
            .await
            .unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.user(), Some(ana()));
    }

    #[tokio::test]
    async fn refresh_replaces_both_tokens_and_keeps_user() {
        let (auth, storage, store) = setup();
        auth.push(Ok(grant("access-1", "refresh-1")));
        auth.push(Ok(AuthGrant {
            user: None,
            tokens: TokenPair::new("access-2", "refresh-2"),
        }));

        store
            .login(&Credentials::new("ana@example.com", "pw"))
            .await
            .unwrap();
        let session = store.refresh().await.unwrap();

        assert_eq!(session.access_token.unwrap().as_str(), "access-2");
        assert_eq!(session.refresh_token.unwrap().as_str(), "refresh-2");
        assert_eq!(session.user, Some(ana()));
        assert_eq!(
            storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(),
            Some("refresh-2")
        );
    }

    #[tokio::test]
    async fn failed_refresh_clears_session_and_storage() {
        let (auth, storage, store) = setup();
        auth.push(Ok(grant("access-1", "refresh-1")));
        auth.push(Err(Error::from_status(ApiError::new(401, None))));

        store
            .login(&Credentials::new("ana@example.com", "pw"))
            .await
            .unwrap();
        let err = store.refresh().await.unwrap_err();

        assert!(matches!(err, Error::Refresh { .. }));
        assert!(store.session().is_empty());
        assert!(storage.get(ACCESS_TOKEN_KEY).unwrap().is_none());
        assert!(storage.get(REFRESH_TOKEN_KEY).unwrap().is_none());
        let state: AuthState =
            serde_json::from_str(&storage.get(AUTH_STATE_KEY).unwrap().unwrap()).unwrap();
        assert!(!state.is_authenticated);
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails_without_calling_auth() {
        let (auth, _storage, store) = setup();

        let err = store.refresh().await.unwrap_err();

        let Error::Refresh { source } = err else {
            panic!("expected refresh error");
        };
        assert!(matches!(*source, Error::Auth(AuthError::NoRefreshToken)));
        assert_eq!(auth.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn logout_clears_memory_and_storage() {
        let (auth, storage, store) = setup();
        auth.push(Ok(grant("access-1", "refresh-1")));
        store
            .login(&Credentials::new("ana@example.com", "pw"))
            .await
            .unwrap();

        store.logout();

        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());
        assert!(storage.get(ACCESS_TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_round_trips_a_persisted_session() {
        let (auth, storage, store) = setup();
        auth.push(Ok(grant("access-1", "refresh-1")));
        store
            .login(&Credentials::new("ana@example.com", "pw"))
            .await
            .unwrap();

        let restored = TokenStore::restore(auth.clone(), storage.clone()).unwrap();

        assert!(restored.is_authenticated());
        assert_eq!(restored.access_token().unwrap().as_str(), "access-1");
        assert_eq!(restored.refresh_token().unwrap().as_str(), "refresh-1");
        assert_eq!(restored.user(), Some(ana()));
    }

    #[test]
    fn restore_requires_user_and_flag() {
        let auth = Arc::new(ScriptedAuth::default());
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ACCESS_TOKEN_KEY, "stale").unwrap();

        let restored = TokenStore::restore(auth.clone(), storage.clone()).unwrap();
        assert!(!restored.is_authenticated());

        storage.set(AUTH_STATE_KEY, "{not json").unwrap();
        let restored = TokenStore::restore(auth, storage).unwrap();
        assert!(restored.session().is_empty());
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let (auth, _storage, store) = setup();
        let mut rx = store.subscribe();
        assert!(!rx.borrow().is_authenticated);

        auth.push(Ok(grant("access-1", "refresh-1")));
        store
            .login(&Credentials::new("ana@example.com", "pw"))
            .await
            .unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated);

        store.logout();
        rx.changed().await.unwrap();
        assert!(!rx.borrow().is_authenticated);
    }
}

//! The session as the CLI sees it: stored on disk, restored per invocation.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use marquee_core::{ApiUrl, TokenStore};
use marquee_file::FileStorage;
use marquee_http::{
    AuthenticatedClient, ClientConfig, HttpAuthApi, HttpClient, MoviesService, UploadService,
};

use crate::cli::ConnectionArgs;

/// Everything a command needs to talk to the backend.
pub struct CliContext {
    pub store: TokenStore,
    pub client: AuthenticatedClient,
}

impl CliContext {
    /// Restore the stored session and wire up the clients.
    pub fn open(connection: &ConnectionArgs) -> Result<Self> {
        let api_url = ApiUrl::new(&connection.api_url).context("Invalid API URL")?;
        let dir = storage::data_dir(connection.data_dir.as_deref())?;
        tracing::debug!(dir = %dir.display(), api = %api_url, "Opening session");

        let http =
            HttpClient::new(ClientConfig::new(api_url)).context("Failed to build HTTP client")?;
        let auth = Arc::new(HttpAuthApi::new(http.clone()));
        let store = TokenStore::restore(auth, Arc::new(FileStorage::new(dir)))
            .context("Failed to load session")?;
        let client = AuthenticatedClient::new(http, store.clone());

        Ok(Self { store, client })
    }

    /// Fail unless a session was restored.
    pub fn require_session(&self) -> Result<()> {
        if !self.store.is_authenticated() {
            bail!("No active session. Run 'marquee auth login' first.");
        }
        Ok(())
    }

    pub fn movies(&self) -> MoviesService {
        MoviesService::new(self.client.clone())
    }

    pub fn uploads(&self) -> UploadService {
        UploadService::new(self.client.clone())
    }
}

//! Movie CRUD over the authenticated client.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use marquee_core::pagination::{normalize_page, unwrap_envelope};
use marquee_core::{Movie, MovieId, MoviePatch, MoviePayload, MoviesPage, MoviesQuery, Result};

use crate::authed::AuthenticatedClient;
use crate::cache::MovieCache;
use crate::client::{ApiRequest, ApiResponse};
use crate::endpoints::{self, MOVIES, TOTAL_COUNT_HEADER};

/// Client for the `/movies` resource.
///
/// Single-movie lookups are cached for [`MOVIE_TTL`](crate::cache::MOVIE_TTL);
/// updates and deletes evict the affected entry.
#[derive(Debug, Clone)]
pub struct MoviesService {
    client: AuthenticatedClient,
    cache: Arc<MovieCache>,
}

impl MoviesService {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self::with_cache(client, MovieCache::default())
    }

    pub fn with_cache(client: AuthenticatedClient, cache: MovieCache) -> Self {
        Self {
            client,
            cache: Arc::new(cache),
        }
    }

    /// Fetch one page of movies.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &MoviesQuery) -> Result<MoviesPage> {
        let request = ApiRequest::get(MOVIES).query(query)?;
        let response = self.client.send(&request).await?;
        let page = normalize_page(
            &response.value()?,
            response.header(TOTAL_COUNT_HEADER),
            query,
        )?;
        debug!(items = page.items.len(), total = page.total, "Listed movies");
        Ok(page)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: &MovieId) -> Result<Movie> {
        if let Some(movie) = self.cache.get(id) {
            debug!("Movie served from cache");
            return Ok(movie);
        }
        let generation = self.cache.generation(id);
        let response = self.client.send(&ApiRequest::get(endpoints::movie(id))).await?;
        let movie = decode_movie(&response)?;
        if !self.cache.insert(movie.clone(), generation) {
            debug!("Movie changed while fetching, not caching");
        }
        Ok(movie)
    }

    #[instrument(skip(self, payload), fields(title = %payload.title))]
    pub async fn create(&self, payload: &MoviePayload) -> Result<Movie> {
        let request = ApiRequest::post(MOVIES).json(payload)?;
        decode_movie(&self.client.send(&request).await?)
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: &MovieId, patch: &MoviePatch) -> Result<Movie> {
        let request = ApiRequest::put(endpoints::movie(id)).json(patch)?;
        let outcome = self.client.send(&request).await;
        self.cache.invalidate(id);
        decode_movie(&outcome?)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&self, id: &MovieId) -> Result<()> {
        let outcome = self
            .client
            .send(&ApiRequest::delete(endpoints::movie(id)))
            .await;
        self.cache.invalidate(id);
        outcome.map(|_| ())
    }
}

fn decode_movie(response: &ApiResponse) -> Result<Movie> {
    let body: Value = unwrap_envelope(response.value()?);
    Ok(serde_json::from_value(body).map_err(marquee_core::error::DecodeError::Json)?)
}

//! Short-lived cache of movie details.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use marquee_core::{Movie, MovieId};

/// How long a fetched movie is served from cache.
pub const MOVIE_TTL: Duration = Duration::from_secs(5 * 60);

/// Movies by id, each expiring a fixed time after it was stored.
///
/// Every id carries a generation that [`invalidate`](Self::invalidate)
/// bumps. A fetch records the generation before it is sent and its result is
/// only stored if no invalidation happened in between, so a slow read that
/// races an update cannot put the old record back.
#[derive(Debug)]
pub struct MovieCache {
    ttl: Duration,
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<MovieId, (Instant, Movie)>,
    generations: HashMap<MovieId, u64>,
}

impl CacheState {
    fn generation(&self, id: &MovieId) -> u64 {
        self.generations.get(id).copied().unwrap_or_default()
    }
}

impl MovieCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached movie if it has not expired. Expired entries are
    /// evicted on lookup.
    pub fn get(&self, id: &MovieId) -> Option<Movie> {
        let mut state = self.lock();
        if let Some((stored, movie)) = state.entries.get(id)
            && stored.elapsed() < self.ttl
        {
            return Some(movie.clone());
        }
        state.entries.remove(id);
        None
    }

    /// The current generation of `id`, to pass to [`insert`](Self::insert).
    pub fn generation(&self, id: &MovieId) -> u64 {
        self.lock().generation(id)
    }

    /// Store a movie fetched at `generation`. Returns false, storing
    /// nothing, if the id was invalidated since.
    pub fn insert(&self, movie: Movie, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation(&movie.id) != generation {
            return false;
        }
        state
            .entries
            .insert(movie.id.clone(), (Instant::now(), movie));
        true
    }

    pub fn invalidate(&self, id: &MovieId) {
        let mut state = self.lock();
        state.entries.remove(id);
        *state.generations.entry(id.clone()).or_default() += 1;
    }
}

impl Default for MovieCache {
    fn default() -> Self {
        Self::new(MOVIE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn movie(id: &str, title: &str) -> Movie {
        serde_json::from_value(json!({"id": id, "title": title})).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = MovieCache::default();
        let id = MovieId::new("m1").unwrap();
        assert!(cache.insert(movie("m1", "Alien"), cache.generation(&id)));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get(&id).is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(&id).is_none());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = MovieCache::default();
        let id = MovieId::new("m1").unwrap();
        cache.insert(movie("m1", "Alien"), cache.generation(&id));
        cache.invalidate(&id);
        assert!(cache.get(&id).is_none());
    }

    #[tokio::test]
    async fn fetch_started_before_invalidation_is_not_stored() {
        let cache = MovieCache::default();
        let id = MovieId::new("m1").unwrap();

        let fetched_at = cache.generation(&id);
        cache.invalidate(&id);
        assert!(!cache.insert(movie("m1", "Old"), fetched_at));
        assert!(cache.get(&id).is_none());

        assert!(cache.insert(movie("m1", "New"), cache.generation(&id)));
        assert_eq!(cache.get(&id).unwrap().title, "New");
    }

    #[tokio::test]
    async fn invalidating_one_id_leaves_others() {
        let cache = MovieCache::default();
        let m1 = MovieId::new("m1").unwrap();
        let m2 = MovieId::new("m2").unwrap();

        let fetched_at = cache.generation(&m2);
        cache.invalidate(&m1);
        assert!(cache.insert(movie("m2", "Heat"), fetched_at));
    }
}

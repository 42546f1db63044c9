use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::Movie;
use crate::storage::SlotStorage;

pub const FAVORITES_SLOT: &str = "movieExplorerFavorites";

/// The user's watchlist: ordered, unique by movie id, and written back to its
/// slot on every change.
pub struct FavoritesStore {
    storage: Arc<dyn SlotStorage>,
    movies: Vec<Movie>,
}

impl FavoritesStore {
    /// Never fails: an absent, unreadable or malformed snapshot loads as an
    /// empty list.
    pub fn load(storage: Arc<dyn SlotStorage>) -> Self {
        let movies = match storage.read(FAVORITES_SLOT) {
            Ok(Some(text)) => match serde_json::from_str::<Vec<Movie>>(&text) {
                Ok(movies) => dedupe(movies),
                Err(e) => {
                    warn!("Stored favorites are not valid, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read stored favorites, starting empty: {:#}", e);
                Vec::new()
            }
        };
        debug!("Loaded {} favorites", movies.len());
        Self { storage, movies }
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn contains(&self, movie: &Movie) -> bool {
        self.contains_id(movie.id)
    }

    pub fn contains_id(&self, id: u64) -> bool {
        self.movies.iter().any(|m| m.id == id)
    }

    pub fn get(&self, id: u64) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == id)
    }

    /// Adds or removes `movie` and persists the result before returning.
    /// Returns whether the movie is a favorite afterwards.
    pub fn toggle(&mut self, movie: &Movie) -> Result<bool> {
        let exists = self.contains(movie);
        let next: Vec<Movie> = if exists {
            self.movies
                .iter()
                .filter(|m| m.id != movie.id)
                .cloned()
                .collect()
        } else {
            let mut next = self.movies.clone();
            next.push(movie.clone());
            next
        };

        let snapshot = serde_json::to_string(&next).context("Failed to serialize favorites")?;
        self.storage
            .write(FAVORITES_SLOT, &snapshot)
            .context("Failed to persist favorites")?;
        self.movies = next;

        info!(
            "{} '{}' ({}) {} watchlist",
            if exists { "Removed" } else { "Added" },
            movie.title,
            movie.id,
            if exists { "from" } else { "to" }
        );
        Ok(!exists)
    }
}

fn dedupe(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = HashSet::new();
    movies.into_iter().filter(|m| seen.insert(m.id)).collect()
}

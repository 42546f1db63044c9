//! Fail-soft front for the catalog API: every lookup yields a plain value and a
//! failure is logged and turned into an empty result.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::{Genre, Movie, Video};
use crate::tmdb::{CatalogApi, TimeWindow};

#[derive(Clone)]
pub struct Catalog {
    api: Arc<dyn CatalogApi>,
}

impl Catalog {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    pub async fn trending(&self, window: TimeWindow) -> Vec<Movie> {
        match self.api.trending(window).await {
            Ok(movies) => movies,
            Err(e) => {
                warn!("Trending fetch failed: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Returns `None` without calling the API when the query is blank.
    pub async fn search(&self, query: &str) -> Option<Vec<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            debug!("Skipping search for empty query");
            return None;
        }
        match self.api.search(query).await {
            Ok(movies) => Some(movies),
            Err(e) => {
                warn!("Search for '{}' failed: {:#}", query, e);
                Some(Vec::new())
            }
        }
    }

    pub async fn genres(&self) -> Vec<Genre> {
        match self.api.genres().await {
            Ok(genres) => genres,
            Err(e) => {
                warn!("Genre fetch failed: {:#}", e);
                Vec::new()
            }
        }
    }

    pub async fn similar(&self, movie_id: u64) -> Vec<Movie> {
        match self.api.similar(movie_id).await {
            Ok(movies) => movies,
            Err(e) => {
                warn!("Similar fetch for movie {} failed: {:#}", movie_id, e);
                Vec::new()
            }
        }
    }

    pub async fn videos(&self, movie_id: u64) -> Vec<Video> {
        match self.api.videos(movie_id).await {
            Ok(videos) => videos,
            Err(e) => {
                warn!("Videos fetch for movie {} failed: {:#}", movie_id, e);
                Vec::new()
            }
        }
    }
}

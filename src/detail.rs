//! The single-movie overlay and its related data.
//!
//! Each `open` hands out a fresh [`SelectionToken`]. Fetch results carry the
//! token they were started with and are dropped unless it is still current, so
//! a late answer can neither reopen a closed overlay nor land on a newer
//! selection.

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::models::{Movie, Video};
use crate::tmdb::select_trailer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct OpenDetail {
    pub movie: Movie,
    pub similar: Vec<Movie>,
    pub trailer: Option<Video>,
    pub similar_loaded: bool,
    pub videos_loaded: bool,
}

impl OpenDetail {
    pub fn is_loading(&self) -> bool {
        !(self.similar_loaded && self.videos_loaded)
    }
}

#[derive(Debug, Default)]
pub struct DetailSelection {
    generation: u64,
    current: Option<OpenDetail>,
}

impl DetailSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&OpenDetail> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Replaces any previous selection; related data starts out empty.
    pub fn open(&mut self, movie: Movie) -> SelectionToken {
        self.generation += 1;
        info!("Opening detail for '{}' ({})", movie.title, movie.id);
        self.current = Some(OpenDetail {
            movie,
            similar: Vec::new(),
            trailer: None,
            similar_loaded: false,
            videos_loaded: false,
        });
        SelectionToken(self.generation)
    }

    pub fn close(&mut self) {
        self.generation += 1;
        if let Some(detail) = self.current.take() {
            info!("Closed detail for '{}' ({})", detail.movie.title, detail.movie.id);
        }
    }

    fn accepting(&mut self, token: SelectionToken) -> Option<&mut OpenDetail> {
        if token.0 != self.generation {
            return None;
        }
        self.current.as_mut()
    }

    pub fn apply_similar(&mut self, token: SelectionToken, movies: Vec<Movie>) -> bool {
        match self.accepting(token) {
            Some(detail) => {
                detail.similar = movies;
                detail.similar_loaded = true;
                true
            }
            None => {
                debug!("Dropping similar movies for a superseded selection");
                false
            }
        }
    }

    pub fn apply_videos(&mut self, token: SelectionToken, videos: &[Video]) -> bool {
        match self.accepting(token) {
            Some(detail) => {
                detail.trailer = select_trailer(videos).cloned();
                detail.videos_loaded = true;
                true
            }
            None => {
                debug!("Dropping videos for a superseded selection");
                false
            }
        }
    }
}

/// Fetches similar movies and videos concurrently. Each branch applies its own
/// result as soon as it arrives; a failed fetch only leaves its own field empty.
pub async fn load_related(
    selection: &Mutex<DetailSelection>,
    catalog: &Catalog,
    token: SelectionToken,
    movie_id: u64,
) {
    let similar = async {
        let movies = catalog.similar(movie_id).await;
        selection.lock().await.apply_similar(token, movies);
    };
    let videos = async {
        let videos = catalog.videos(movie_id).await;
        selection.lock().await.apply_videos(token, &videos);
    };
    tokio::join!(similar, videos);
}

/// Opens `movie` and loads its related data in one go.
pub async fn open_movie(selection: &Mutex<DetailSelection>, catalog: &Catalog, movie: Movie) {
    let movie_id = movie.id;
    let token = selection.lock().await.open(movie);
    load_related(selection, catalog, token, movie_id).await;
}

use serde::Serialize;

use crate::detail::OpenDetail;
use crate::filter::FilterState;
use crate::models::{Genre, Movie};

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const PLACEHOLDER: &str = "N/A";
const SIMILAR_STRIP_LEN: usize = 10;

pub const NO_MOVIES: &str = "No movies found";
pub const EMPTY_WATCHLIST: &str = "Your watchlist is empty";
const NO_OVERVIEW: &str = "No description available.";

fn tmdb_image(size: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE}/{size}{p}"))
}

fn year_label(movie: &Movie) -> String {
    movie.release_year().unwrap_or(PLACEHOLDER).to_string()
}

fn rating_label(movie: &Movie) -> String {
    movie
        .vote_average
        .map(|r| format!("{r:.1}"))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverMode {
    Trending,
    Search,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieCard {
    pub id: u64,
    pub title: String,
    pub year: String,
    pub rating: String,
    pub poster_url: Option<String>,
    /// Present on Discover cards only; Watchlist cards carry no toggle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<FavoriteBadge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteBadge {
    pub active: bool,
    pub label: &'static str,
}

impl MovieCard {
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            year: year_label(movie),
            rating: rating_label(movie),
            poster_url: tmdb_image("w500", movie.poster_path.as_deref()),
            favorite: None,
        }
    }

    pub fn with_favorite(mut self, active: bool) -> Self {
        let label = if active {
            "★ In Watchlist"
        } else {
            "☆ Add to Watchlist"
        };
        self.favorite = Some(FavoriteBadge { active, label });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverPage {
    pub mode: DiscoverMode,
    pub query: String,
    pub loading: bool,
    pub genres: Vec<Genre>,
    pub filters: FilterState,
    pub total: usize,
    pub movies: Vec<MovieCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistPage {
    pub movies: Vec<MovieCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl WatchlistPage {
    pub fn from_favorites(favorites: &[Movie]) -> Self {
        Self {
            movies: favorites.iter().map(MovieCard::from_movie).collect(),
            empty_message: favorites.is_empty().then_some(EMPTY_WATCHLIST),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarCard {
    pub id: u64,
    pub title: String,
    pub poster_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub id: u64,
    pub title: String,
    pub image_url: Option<String>,
    pub year: String,
    pub rating: String,
    pub overview: String,
    pub trailer_url: Option<String>,
    pub favorite: bool,
    pub loading: bool,
    pub similar: Vec<SimilarCard>,
}

impl DetailView {
    pub fn from_detail(detail: &OpenDetail, favorite: bool) -> Self {
        let movie = &detail.movie;
        let image_url = tmdb_image("w780", movie.backdrop_path.as_deref())
            .or_else(|| tmdb_image("w500", movie.poster_path.as_deref()));
        let overview = movie
            .overview
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .unwrap_or(NO_OVERVIEW)
            .to_string();
        Self {
            id: movie.id,
            title: movie.title.clone(),
            image_url,
            year: year_label(movie),
            rating: rating_label(movie),
            overview,
            trailer_url: detail.trailer.as_ref().map(|v| v.watch_url()),
            favorite,
            loading: detail.is_loading(),
            similar: detail
                .similar
                .iter()
                .take(SIMILAR_STRIP_LEN)
                .map(|m| SimilarCard {
                    id: m.id,
                    title: m.title.clone(),
                    poster_url: tmdb_image("w185", m.poster_path.as_deref()),
                })
                .collect(),
        }
    }
}

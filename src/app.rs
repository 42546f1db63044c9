use crate::catalog::Catalog;
use crate::config::Config;
use crate::detail::{self, DetailSelection};
use crate::favorites::FavoritesStore;
use crate::filter::{apply_filters, FilterState};
use crate::models::{Genre, Movie};
use crate::storage::{FileStorage, SlotStorage};
use crate::tmdb::{CatalogApi, TimeWindow, TmdbClient};
use crate::views::{DetailView, DiscoverMode, DiscoverPage, MovieCard, WatchlistPage, NO_MOVIES};
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub favorites: Arc<Mutex<FavoritesStore>>,
    pub discover: Arc<Mutex<DiscoverState>>,
    pub detail: Arc<Mutex<DetailSelection>>,
}

#[derive(Debug, Clone)]
pub struct DiscoverState {
    pub mode: DiscoverMode,
    pub query: String,
    pub loading: bool,
    pub movies: Vec<Movie>,
    pub genres: Vec<Genre>,
    pub filters: FilterState,
}

impl Default for DiscoverState {
    fn default() -> Self {
        Self {
            mode: DiscoverMode::Trending,
            query: String::new(),
            loading: false,
            movies: Vec::new(),
            genres: Vec::new(),
            filters: FilterState::default(),
        }
    }
}

impl AppState {
    pub fn new(api: Arc<dyn CatalogApi>, storage: Arc<dyn SlotStorage>) -> Self {
        Self {
            catalog: Catalog::new(api),
            favorites: Arc::new(Mutex::new(FavoritesStore::load(storage))),
            discover: Arc::new(Mutex::new(DiscoverState::default())),
            detail: Arc::new(Mutex::new(DetailSelection::new())),
        }
    }

    /// Initial Discover content: trending movies and the genre list, fetched together.
    pub async fn bootstrap(&self) {
        let (_, genres) = tokio::join!(self.refresh_trending(), self.catalog.genres());
        info!("Loaded {} genres", genres.len());
        self.discover.lock().await.genres = genres;
    }

    pub async fn refresh_trending(&self) {
        self.discover.lock().await.loading = true;
        let movies = self.catalog.trending(TimeWindow::Week).await;
        info!("Loaded {} trending movies", movies.len());
        let mut discover = self.discover.lock().await;
        discover.movies = movies;
        discover.mode = DiscoverMode::Trending;
        discover.loading = false;
    }

    /// A blank query leaves the current results in place.
    pub async fn run_search(&self, query: &str) {
        {
            let mut discover = self.discover.lock().await;
            discover.query = query.to_string();
            discover.mode = DiscoverMode::Search;
            if query.trim().is_empty() {
                return;
            }
            discover.loading = true;
        }
        let found = self.catalog.search(query).await;
        let mut discover = self.discover.lock().await;
        if let Some(movies) = found {
            info!("Search '{}' returned {} movies", query.trim(), movies.len());
            discover.movies = movies;
        }
        discover.loading = false;
    }

    pub async fn discover_page(&self) -> DiscoverPage {
        let discover = self.discover.lock().await;
        let favorites = self.favorites.lock().await;
        let visible = apply_filters(&discover.movies, &discover.filters);
        let movies: Vec<MovieCard> = visible
            .iter()
            .map(|m| MovieCard::from_movie(m).with_favorite(favorites.contains(m)))
            .collect();
        let empty_message = (movies.is_empty() && !discover.loading).then_some(NO_MOVIES);
        DiscoverPage {
            mode: discover.mode,
            query: discover.query.clone(),
            loading: discover.loading,
            genres: discover.genres.clone(),
            filters: discover.filters.clone(),
            total: discover.movies.len(),
            movies,
            empty_message,
        }
    }

    pub async fn watchlist_page(&self) -> WatchlistPage {
        let favorites = self.favorites.lock().await;
        WatchlistPage::from_favorites(favorites.movies())
    }

    pub async fn detail_view(&self) -> Option<DetailView> {
        let detail = self.detail.lock().await;
        let open = detail.current()?;
        let favorite = self.favorites.lock().await.contains(&open.movie);
        Some(DetailView::from_detail(open, favorite))
    }

    /// Any movie the user can currently see: Discover results, the watchlist,
    /// or the open detail and its similar strip.
    pub async fn find_movie(&self, id: u64) -> Option<Movie> {
        if let Some(m) = self
            .discover
            .lock()
            .await
            .movies
            .iter()
            .find(|m| m.id == id)
        {
            return Some(m.clone());
        }
        if let Some(m) = self.favorites.lock().await.get(id) {
            return Some(m.clone());
        }
        let detail = self.detail.lock().await;
        let open = detail.current()?;
        if open.movie.id == id {
            return Some(open.movie.clone());
        }
        open.similar.iter().find(|m| m.id == id).cloned()
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let api: Arc<dyn CatalogApi> = Arc::new(TmdbClient::new(config.tmdb_api_key.clone())?);
    let storage: Arc<dyn SlotStorage> = Arc::new(FileStorage::new(&config.data_dir));
    info!("Storing favorites under {}", config.data_dir.display());

    let state = AppState::new(api, storage);
    state.bootstrap().await;

    let app = build_router(state);

    info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(discover))
        .route("/trending", post(trending))
        .route("/search", post(search))
        .route("/search/reset", post(reset_search))
        .route("/filters", get(get_filters).put(put_filters))
        .route("/genres", get(genres))
        .route("/watchlist", get(watchlist))
        .route("/watchlist/:id", post(toggle_favorite))
        .route("/movies/:id/open", post(open_movie))
        .route("/detail", get(get_detail).delete(close_detail))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn discover(State(state): State<AppState>) -> Json<DiscoverPage> {
    Json(state.discover_page().await)
}

async fn trending(State(state): State<AppState>) -> Json<DiscoverPage> {
    state.refresh_trending().await;
    Json(state.discover_page().await)
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
}

async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Json<DiscoverPage> {
    state.run_search(&req.query).await;
    Json(state.discover_page().await)
}

async fn reset_search(State(state): State<AppState>) -> Json<DiscoverPage> {
    {
        let mut discover = state.discover.lock().await;
        discover.query.clear();
        discover.mode = DiscoverMode::Search;
    }
    Json(state.discover_page().await)
}

async fn get_filters(State(state): State<AppState>) -> Json<FilterState> {
    Json(state.discover.lock().await.filters.clone())
}

async fn put_filters(
    State(state): State<AppState>,
    Json(filters): Json<FilterState>,
) -> Json<DiscoverPage> {
    state.discover.lock().await.filters = filters;
    Json(state.discover_page().await)
}

async fn genres(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.discover.lock().await.genres.clone())
}

async fn watchlist(State(state): State<AppState>) -> Json<WatchlistPage> {
    Json(state.watchlist_page().await)
}

async fn toggle_favorite(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let Some(movie) = state.find_movie(id).await else {
        warn!("Cannot toggle unknown movie {}", id);
        return not_found(id);
    };
    let result = state.favorites.lock().await.toggle(&movie);
    match result {
        Ok(favorite) => Json(json!({ "id": id, "favorite": favorite })).into_response(),
        Err(e) => {
            error!("Failed to update watchlist: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to save watchlist" })),
            )
                .into_response()
        }
    }
}

async fn open_movie(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let Some(movie) = state.find_movie(id).await else {
        warn!("Cannot open unknown movie {}", id);
        return not_found(id);
    };
    let token = state.detail.lock().await.open(movie);

    let state_for_task = state.clone();
    tokio::spawn(async move {
        detail::load_related(
            &state_for_task.detail,
            &state_for_task.catalog,
            token,
            id,
        )
        .await;
    });

    match state.detail_view().await {
        Some(view) => (StatusCode::ACCEPTED, Json(view)).into_response(),
        // Closed again before we got here.
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn get_detail(State(state): State<AppState>) -> Response {
    match state.detail_view().await {
        Some(view) => Json(view).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn close_detail(State(state): State<AppState>) -> StatusCode {
    state.detail.lock().await.close();
    StatusCode::NO_CONTENT
}

fn not_found(id: u64) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("movie {} is not in view", id) })),
    )
        .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}

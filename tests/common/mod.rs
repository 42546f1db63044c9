#![allow(dead_code)]

use anyhow::anyhow;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use movie_explorer::app::{build_router, AppState};
use movie_explorer::models::{Genre, Movie, Video};
use movie_explorer::storage::{MemoryStorage, SlotStorage};
use movie_explorer::tmdb::{CatalogApi, TimeWindow};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tower::util::ServiceExt;

#[derive(Default)]
pub struct FakeCatalog {
    pub trending: Vec<Movie>,
    pub search_results: Vec<Movie>,
    pub genres: Vec<Genre>,
    pub similar: Vec<Movie>,
    pub videos: Vec<Video>,
    pub fail_trending: bool,
    pub fail_search: bool,
    pub fail_similar: bool,
    pub fail_videos: bool,
    pub searches: Mutex<Vec<String>>,
    /// When set, the first `similar` call waits for a permit and answers with
    /// `gated_similar` instead of `similar`.
    pub gate: Option<Arc<Semaphore>>,
    pub gated_similar: Vec<Movie>,
    pub similar_calls: AtomicUsize,
    pub similar_done: AtomicUsize,
}

#[async_trait::async_trait]
impl CatalogApi for FakeCatalog {
    async fn trending(&self, window: TimeWindow) -> anyhow::Result<Vec<Movie>> {
        assert_eq!(window, TimeWindow::Week);
        if self.fail_trending {
            return Err(anyhow!("trending unavailable"));
        }
        Ok(self.trending.clone())
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<Movie>> {
        self.searches.lock().unwrap().push(query.to_string());
        if self.fail_search {
            return Err(anyhow!("search unavailable"));
        }
        Ok(self.search_results.clone())
    }

    async fn genres(&self) -> anyhow::Result<Vec<Genre>> {
        Ok(self.genres.clone())
    }

    async fn similar(&self, _movie_id: u64) -> anyhow::Result<Vec<Movie>> {
        let call = self.similar_calls.fetch_add(1, Ordering::SeqCst);
        let result = match (&self.gate, call) {
            (Some(gate), 0) => {
                gate.acquire().await.expect("gate open").forget();
                Ok(self.gated_similar.clone())
            }
            _ if self.fail_similar => Err(anyhow!("similar unavailable")),
            _ => Ok(self.similar.clone()),
        };
        self.similar_done.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn videos(&self, _movie_id: u64) -> anyhow::Result<Vec<Video>> {
        if self.fail_videos {
            return Err(anyhow!("videos unavailable"));
        }
        Ok(self.videos.clone())
    }
}

pub fn movie(id: u64, title: &str, rating: f64, date: &str, genres: &[u32]) -> Movie {
    let mut m = Movie::new(id, title);
    m.vote_average = Some(rating);
    m.release_date = Some(date.to_string());
    m.genre_ids = genres.to_vec();
    m.poster_path = Some(format!("/{id}.jpg"));
    m.overview = Some(format!("About {title}"));
    m
}

pub fn video(key: &str, site: &str, kind: &str) -> Video {
    Video {
        key: key.to_string(),
        site: site.to_string(),
        video_type: kind.to_string(),
        name: None,
    }
}

pub fn trending_fixture() -> Vec<Movie> {
    vec![
        movie(1, "Dune: Part Two", 8.2, "2024-02-27", &[878, 12]),
        movie(2, "Wonka", 7.1, "2023-12-06", &[35, 10751]),
        movie(3, "Oppenheimer", 8.1, "2023-07-19", &[18, 36]),
        movie(4, "Argylle", 6.1, "2024-01-31", &[28, 35]),
    ]
}

pub fn genres_fixture() -> Vec<Genre> {
    vec![
        Genre { id: 12, name: "Adventure".to_string() },
        Genre { id: 18, name: "Drama".to_string() },
        Genre { id: 35, name: "Comedy".to_string() },
    ]
}

pub async fn app_with(catalog: FakeCatalog) -> (Router, AppState, Arc<FakeCatalog>) {
    app_with_storage(catalog, Arc::new(MemoryStorage::new())).await
}

pub async fn app_with_storage(
    catalog: FakeCatalog,
    storage: Arc<dyn SlotStorage>,
) -> (Router, AppState, Arc<FakeCatalog>) {
    let catalog = Arc::new(catalog);
    let state = AppState::new(catalog.clone(), storage);
    state.bootstrap().await;
    (build_router(state.clone()), state, catalog)
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res: Response<Body> = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, Request::get(path).body(Body::empty()).unwrap()).await
}

pub async fn post(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, Request::post(path).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, Request::delete(path).body(Body::empty()).unwrap()).await
}

pub async fn send_json(app: &Router, method: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub fn card_ids(page: &Value) -> Vec<u64> {
    page["movies"]
        .as_array()
        .expect("movies array")
        .iter()
        .map(|m| m["id"].as_u64().expect("numeric id"))
        .collect()
}

/// Polls `GET /detail` until it reports `loading: false`.
pub async fn wait_for_detail_loaded(app: &Router) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let (status, body) = get(app, "/detail").await;
        if status == StatusCode::OK && body["loading"] == Value::Bool(false) {
            return body;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for detail to load (last: {status} {body})");
        }
        tokio::task::yield_now().await;
    }
}

pub async fn wait_for_counter(counter: &AtomicUsize, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while counter.load(Ordering::SeqCst) < expected {
        if tokio::time::Instant::now() >= deadline {
            panic!(
                "timed out waiting for counter to reach {} (got {})",
                expected,
                counter.load(Ordering::SeqCst)
            );
        }
        tokio::task::yield_now().await;
    }
    // Let the fetching task apply (or drop) the result it just produced.
    tokio::time::sleep(Duration::from_millis(50)).await;
}

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::models::{Genre, Movie, Video};

const TMDB_BASE: &str = "https://api.themoviedb.org/3";
const TRAILER_SITE: &str = "YouTube";
const TRAILER_TYPE: &str = "Trailer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    fn as_path(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn trending(&self, window: TimeWindow) -> Result<Vec<Movie>>;
    async fn search(&self, query: &str) -> Result<Vec<Movie>>;
    async fn genres(&self) -> Result<Vec<Genre>>;
    async fn similar(&self, movie_id: u64) -> Result<Vec<Movie>>;
    async fn videos(&self, movie_id: u64) -> Result<Vec<Video>>;
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
}

// The key must never reach a log line.
impl fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbClient")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct Paged<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let user_agent = format!("movie-explorer/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// `path_and_query` is relative to the API base and must not carry the key;
    /// it is what error messages report.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{TMDB_BASE}{path_and_query}");
        let res = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("request to {path_and_query} failed"))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {} {}", path_and_query, status, text));
        }
        let parsed: T = serde_json::from_str(&text)
            .with_context(|| format!("JSON parse failed for {path_and_query}"))?;
        Ok(parsed)
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn trending(&self, window: TimeWindow) -> Result<Vec<Movie>> {
        let path = format!("/trending/movie/{}", window.as_path());
        let data: Paged<Movie> = self.get_json(&path).await?;
        Ok(data.results)
    }

    async fn search(&self, query: &str) -> Result<Vec<Movie>> {
        let path = format!(
            "/search/movie?query={}&language=en-US",
            urlencoding::encode(query)
        );
        let data: Paged<Movie> = self.get_json(&path).await?;
        Ok(data.results)
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        let data: GenreList = self.get_json("/genre/movie/list?language=en-US").await?;
        Ok(data.genres)
    }

    async fn similar(&self, movie_id: u64) -> Result<Vec<Movie>> {
        let path = format!("/movie/{movie_id}/similar?language=en-US&page=1");
        let data: Paged<Movie> = self.get_json(&path).await?;
        Ok(data.results)
    }

    async fn videos(&self, movie_id: u64) -> Result<Vec<Video>> {
        let path = format!("/movie/{movie_id}/videos?language=en-US");
        let data: Paged<Video> = self.get_json(&path).await?;
        Ok(data.results)
    }
}

/// First YouTube trailer in list order, if any.
pub fn select_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.site == TRAILER_SITE && v.video_type == TRAILER_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn video(key: &str, site: &str, kind: &str) -> Video {
        Video {
            key: key.to_string(),
            site: site.to_string(),
            video_type: kind.to_string(),
            name: None,
        }
    }

    #[test]
    fn picks_the_first_matching_trailer_even_when_not_first() {
        let videos = vec![
            video("teaser", "YouTube", "Teaser"),
            video("real", "YouTube", "Trailer"),
            video("later", "YouTube", "Trailer"),
        ];
        assert_eq!(select_trailer(&videos).map(|v| v.key.as_str()), Some("real"));
    }

    #[test]
    fn ignores_trailers_hosted_elsewhere() {
        let videos = vec![video("vimeo", "Vimeo", "Trailer"), video("clip", "YouTube", "Clip")];
        assert!(select_trailer(&videos).is_none());
        assert!(select_trailer(&[]).is_none());
    }

    #[test]
    fn paged_results_default_to_empty() {
        let data: Paged<Movie> = serde_json::from_value(json!({ "page": 1 })).unwrap();
        assert!(data.results.is_empty());
    }

    #[test]
    fn debug_output_redacts_the_api_key() {
        let client = TmdbClient::new("super-secret").expect("client builds");
        let printed = format!("{:?}", client);
        assert!(!printed.contains("super-secret"));
    }
}

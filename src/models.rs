use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalog movie record as received from TMDB.
///
/// Fields the service does not interpret are kept in `extra` so that a
/// favorited movie is persisted as the full record it arrived as.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Movie {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            release_date: None,
            vote_average: None,
            poster_path: None,
            backdrop_path: None,
            overview: None,
            genre_ids: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Release date with TMDB's empty-string placeholder folded into `None`.
    pub fn release_date(&self) -> Option<&str> {
        self.release_date.as_deref().filter(|d| !d.is_empty())
    }

    pub fn release_year(&self) -> Option<&str> {
        self.release_date()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
    }

    pub fn rating(&self) -> f64 {
        self.vote_average.unwrap_or(0.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Video {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.key)
    }
}

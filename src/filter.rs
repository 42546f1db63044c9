use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Movie;

/// User-adjustable narrowing of a movie list. Unset fields pass everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, deserialize_with = "lenient_genre")]
    pub genre: Option<u32>,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub min_rating: f64,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<String>,
}

impl FilterState {
    pub fn is_neutral(&self) -> bool {
        self.genre.is_none() && !self.rating_active() && self.year.is_none()
    }

    fn rating_active(&self) -> bool {
        self.min_rating.is_finite() && self.min_rating != 0.0
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        let genre_ok = self
            .genre
            .map_or(true, |genre| movie.genre_ids.contains(&genre));
        let rating_ok = !self.rating_active() || movie.rating() >= self.min_rating;
        let year_ok = match self.year.as_deref() {
            None => true,
            Some(year) => movie
                .release_date
                .as_deref()
                .is_some_and(|date| date.starts_with(year)),
        };
        genre_ok && rating_ok && year_ok
    }
}

/// Keeps the movies passing every active predicate, in input order.
pub fn apply_filters(movies: &[Movie], filters: &FilterState) -> Vec<Movie> {
    movies
        .iter()
        .filter(|m| filters.matches(m))
        .cloned()
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
}

fn loose<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Loose>, D::Error> {
    Option::<Loose>::deserialize(deserializer)
}

fn lenient_genre<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let id = match loose(deserializer)? {
        Some(Loose::Number(n)) if n.fract() == 0.0 && n > 0.0 && n <= u32::MAX as f64 => {
            Some(n as u32)
        }
        Some(Loose::Text(s)) => s.trim().parse::<u32>().ok().filter(|id| *id != 0),
        _ => None,
    };
    Ok(id)
}

fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let rating = match loose(deserializer)? {
        Some(Loose::Number(n)) => n,
        Some(Loose::Text(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    };
    Ok(if rating.is_finite() { rating } else { 0.0 })
}

fn lenient_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let year = match loose(deserializer)? {
        Some(Loose::Number(n)) if n.fract() == 0.0 && n >= 0.0 => Some(format!("{}", n as u64)),
        Some(Loose::Text(s)) => Some(s.trim().to_string()),
        _ => None,
    };
    Ok(year.filter(|y| !y.is_empty()))
}

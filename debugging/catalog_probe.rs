//! Query the TMDB catalog the way the server does and print the raw results.
//! Usage:
//!   cargo run --bin catalog_probe -- trending [day|week]
//!   cargo run --bin catalog_probe -- search <query...>
//!   cargo run --bin catalog_probe -- genres
//!   cargo run --bin catalog_probe -- similar <tmdb_id>
//!   cargo run --bin catalog_probe -- videos <tmdb_id>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use movie_explorer::tmdb::{select_trailer, CatalogApi, TimeWindow, TmdbClient};
use serde_json::json;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Probe {
    Trending,
    Search,
    Genres,
    Similar,
    Videos,
}

impl FromStr for Probe {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trending" => Ok(Probe::Trending),
            "search" => Ok(Probe::Search),
            "genres" => Ok(Probe::Genres),
            "similar" => Ok(Probe::Similar),
            "videos" => Ok(Probe::Videos),
            _ => Err(anyhow::anyhow!(
                "probe must be one of trending, search, genres, similar, videos"
            )),
        }
    }
}

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin catalog_probe -- trending [day|week]");
    eprintln!("       cargo run --bin catalog_probe -- search <query...>");
    eprintln!("       cargo run --bin catalog_probe -- genres");
    eprintln!("       cargo run --bin catalog_probe -- similar <tmdb_id>");
    eprintln!("       cargo run --bin catalog_probe -- videos <tmdb_id>");
    std::process::exit(1);
}

fn movie_id(args: &[String]) -> Result<u64> {
    args.get(2)
        .ok_or_else(|| anyhow::anyhow!("missing tmdb_id"))?
        .parse()
        .context("tmdb_id must be an integer")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let probe = Probe::from_str(&args[1])?;
    let api_key = env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
    let client = TmdbClient::new(api_key)?;

    let output = match probe {
        Probe::Trending => {
            let window = match args.get(2).map(String::as_str) {
                Some("day") => TimeWindow::Day,
                None | Some("week") => TimeWindow::Week,
                Some(_) => usage(),
            };
            serde_json::to_value(client.trending(window).await?)?
        }
        Probe::Search => {
            let query = args[2..].join(" ");
            if query.trim().is_empty() {
                usage();
            }
            serde_json::to_value(client.search(&query).await?)?
        }
        Probe::Genres => serde_json::to_value(client.genres().await?)?,
        Probe::Similar => serde_json::to_value(client.similar(movie_id(&args)?).await?)?,
        Probe::Videos => {
            let videos = client.videos(movie_id(&args)?).await?;
            let trailer = select_trailer(&videos).map(|v| v.watch_url());
            json!({ "trailer": trailer, "videos": videos })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

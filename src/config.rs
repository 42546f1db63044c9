use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ADDR: &str = "0.0.0.0:3146";

#[derive(Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub data_dir: PathBuf,
    pub addr: SocketAddr,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("tmdb_api_key", &"<redacted>")
            .field("data_dir", &self.data_dir)
            .field("addr", &self.addr)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let tmdb_api_key = env::var("TMDB_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .context("TMDB_API_KEY not set")?;
        let data_dir = env::var("MOVIE_EXPLORER_DATA_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let addr_raw = env::var("MOVIE_EXPLORER_ADDR")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse()
            .with_context(|| format!("MOVIE_EXPLORER_ADDR is not a socket address: {addr_raw}"))?;
        Ok(Self {
            tmdb_api_key,
            data_dir: PathBuf::from(data_dir),
            addr,
        })
    }
}

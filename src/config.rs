use serde::Deserialize;
use std::path::PathBuf;

/// Durable backend for the wishlist slot
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key under `DATA_DIR`
    #[default]
    File,
    /// One string key in Redis at `REDIS_URL`
    Redis,
    /// Process memory only; lost on restart
    Memory,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key, sent as the `api_key` query parameter
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB image CDN base URL
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Where the wishlist is persisted
    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Directory used by the file backend
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Key holding the serialized wishlist
    #[serde(default = "default_wishlist_key")]
    pub wishlist_key: String,

    /// Redis connection URL. Enables the metadata cache when set.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_wishlist_key() -> String {
    "movie-manager-wishlist".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects combinations the service cannot start with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tmdb_api_key.trim().is_empty() {
            anyhow::bail!("TMDB_API_KEY must not be empty");
        }
        if self.wishlist_key.trim().is_empty() {
            anyhow::bail!("WISHLIST_KEY must not be empty");
        }
        if self.storage_backend == StorageBackend::Redis && self.redis_url.is_none() {
            anyhow::bail!("STORAGE_BACKEND=redis requires REDIS_URL");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

use super::error::{Error, Result};
use std::path::PathBuf;

/// Default base URL of the remote movie catalog (OMDb-shaped API).
pub const DEFAULT_API_BASE_URL: &str = "http://www.omdbapi.com";

/// Configuration for filmigyan
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for filmigyan data
    pub base_dir: PathBuf,
    /// Path to the persisted watched-list store
    pub watched_path: PathBuf,
    /// Base URL of the remote catalog
    pub api_base_url: String,
    /// API key sent with every catalog request
    pub api_key: String,
}

impl Config {
    /// Get the default configuration directory
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
            .map(|home| home.join(".filmigyan"))
    }

    /// Create a new configuration
    pub fn new(base_dir: Option<PathBuf>, api_key: impl Into<String>) -> Result<Self> {
        let base_dir = base_dir.unwrap_or_else(|| {
            Self::default_base_dir().unwrap_or_else(|_| PathBuf::from(".filmigyan"))
        });

        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }

        Ok(Self {
            watched_path: base_dir.join("state").join("watched.redb"),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key,
            base_dir,
        })
    }

    /// Override the catalog base URL (e.g. for a proxy or a test stub)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Initialize the configuration directories
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        if let Some(parent) = self.watched_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Check if the configuration is already initialized
    pub fn is_initialized(&self) -> bool {
        self.base_dir.exists()
            && self
                .watched_path
                .parent()
                .map(|p| p.exists())
                .unwrap_or(false)
    }
}

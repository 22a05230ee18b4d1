//! Application configuration
//!
//! Everything has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! [api]
//! requests_per_second = 2.0
//!
//! [streaming]
//! base_url = "https://v6.voiranime.com"
//! use_overrides = false
//!
//! [[streaming.overrides]]
//! anime_id = 21
//! url = "https://streamtape.com/e/3popy1kWWesard"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::{ClientConfig, DEFAULT_USER_AGENT};
use crate::error::{AnistreamError, Result};

/// Jikan API v4
pub const DEFAULT_API_BASE_URL: &str = "https://api.jikan.moe/v4";

pub const DEFAULT_STREAM_BASE_URL: &str = "https://v6.voiranime.com";

/// Player selected on episode pages
pub const DEFAULT_PLAYER_HOST: &str = "LECTEUR FHD1";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub streaming: StreamingConfig,
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| AnistreamError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AnistreamError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        self.api.client_config().validate("api")?;
        self.streaming.client_config().validate("streaming")?;

        if self.api.base_url.trim().is_empty() {
            return Err(AnistreamError::Config("api.base_url is empty".to_string()));
        }
        if self.streaming.base_url.trim().is_empty() {
            return Err(AnistreamError::Config(
                "streaming.base_url is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Metadata API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Jikan allows 3 requests per second
    pub requests_per_second: f64,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            requests_per_second: 3.0,
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            requests_per_second: self.requests_per_second,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Streaming site settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    pub base_url: String,
    /// Value of the `host` query parameter on episode pages
    pub player_host: String,
    pub timeout_secs: u64,
    pub requests_per_second: f64,
    /// Failed candidates are skipped, not retried
    pub max_retries: u32,
    /// Consult the override table before scraping
    pub use_overrides: bool,
    /// Extra override entries, applied on top of the built-in table
    pub overrides: Vec<OverrideEntry>,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STREAM_BASE_URL.to_string(),
            player_host: DEFAULT_PLAYER_HOST.to_string(),
            timeout_secs: 10,
            requests_per_second: 2.0,
            max_retries: 0,
            use_overrides: true,
            overrides: Vec::new(),
        }
    }
}

impl StreamingConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            requests_per_second: self.requests_per_second,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// One `anime_id -> url` override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub anime_id: u32,
    pub url: String,
}

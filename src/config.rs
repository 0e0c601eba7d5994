//! Runtime configuration for ingestion runs and the edge API.
//!
//! Everything here has a working default; a TOML file only needs the keys
//! it overrides. The cache lifetime and search limits are not
//! configurable (see [`crate::api::cache::CACHE_TTL_SECONDS`] and
//! [`aidb_search::SearchLimits`]).

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::{CatalogError, Result};

/// Default upstream feed.
pub const DEFAULT_FEED_URL: &str = "https://models.dev/api.json";

/// Default Ollama library site.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "https://ollama.com";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AidbConfig {
    /// Ingestion settings.
    pub ingest: IngestConfig,
    /// Edge API settings.
    pub api: ApiConfig,
}

/// Ingestion run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// URL of the upstream model feed.
    pub feed_url: String,
    /// Base URL of the Ollama library site.
    pub ollama_base_url: String,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent. If `None`, `aidb/<version>` is sent.
    pub user_agent: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_owned(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_owned(),
            timeout_seconds: 30,
            user_agent: None,
        }
    }
}

/// Edge API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address.
    pub host: String,
    /// Bind port. `0` picks a free port.
    pub port: u16,
    /// Base URL of the object store holding the catalog.
    pub storage_url: String,
    /// Timeout in seconds for object-store requests.
    pub storage_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8787,
            storage_url: "http://127.0.0.1:9000/".to_owned(),
            storage_timeout_seconds: 30,
        }
    }
}

impl AidbConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CatalogError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CatalogError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - all URLs parse and use `http` or `https`
    /// - timeouts are greater than 0
    /// - `api.host` is not empty
    pub fn validate(&self) -> Result<()> {
        validate_url("ingest.feed_url", &self.ingest.feed_url)?;
        validate_url("ingest.ollama_base_url", &self.ingest.ollama_base_url)?;
        validate_url("api.storage_url", &self.api.storage_url)?;
        if self.ingest.timeout_seconds == 0 {
            return Err(CatalogError::Config(
                "ingest.timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.api.storage_timeout_seconds == 0 {
            return Err(CatalogError::Config(
                "api.storage_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.api.host.trim().is_empty() {
            return Err(CatalogError::Config("api.host must not be empty".into()));
        }
        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| CatalogError::Config(format!("{field}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CatalogError::Config(format!(
            "{field}: unsupported scheme `{other}`"
        ))),
    }
}

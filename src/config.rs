//! Configuration file handling
//!
//! Loads `~/.config/pitwall/config.toml` (or the platform equivalent, or a path
//! given with `--config`). Every section and field is optional; anything left
//! out keeps its default.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `api.base_url`
pub const API_BASE_ENV: &str = "PITWALL_API_BASE";

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Upstream F1 API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme and host of the Ergast-compatible API
    pub base_url: String,
    /// Path prefix below the host
    pub prefix: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts for responses with a retryable status
    pub retries: u32,
    /// Status codes worth retrying
    pub retry_statuses: Vec<u16>,
    /// Timeout for the health probe in seconds
    pub health_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jolpi.ca".to_string(),
            prefix: "/ergast/f1".to_string(),
            timeout_secs: 12,
            retries: 0,
            retry_statuses: vec![502, 503, 504],
            health_timeout_secs: 3,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

/// Paginated loader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Items requested per page
    pub page_size: u32,
    /// Attempts per page before the load fails
    pub attempts: u32,
    /// Backoff unit in milliseconds; attempt `n` waits `n * backoff_ms`
    pub backoff_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_size: 200,
            attempts: 3,
            backoff_ms: 600,
        }
    }
}

impl LoaderConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Freshness windows for the in-memory caches, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub collections_ttl_secs: u64,
    pub recent_races_ttl_secs: u64,
    pub drivers_menu_ttl_secs: u64,
    pub constructors_menu_ttl_secs: u64,
    pub health_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            collections_ttl_secs: 300,
            recent_races_ttl_secs: 600,
            drivers_menu_ttl_secs: 1800,
            constructors_menu_ttl_secs: 600,
            health_ttl_secs: 15,
        }
    }
}

impl CacheConfig {
    pub fn collections_ttl(&self) -> Duration {
        Duration::from_secs(self.collections_ttl_secs)
    }

    pub fn recent_races_ttl(&self) -> Duration {
        Duration::from_secs(self.recent_races_ttl_secs)
    }

    pub fn drivers_menu_ttl(&self) -> Duration {
        Duration::from_secs(self.drivers_menu_ttl_secs)
    }

    pub fn constructors_menu_ttl(&self) -> Duration {
        Duration::from_secs(self.constructors_menu_ttl_secs)
    }

    pub fn health_ttl(&self) -> Duration {
        Duration::from_secs(self.health_ttl_secs)
    }
}

/// News headline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// RSS search endpoint
    pub base_url: String,
    /// Headlines per query
    pub limit: usize,
    pub timeout_secs: u64,
    pub ttl_secs: u64,
    /// Interface language, e.g. `en-CA`
    pub language: String,
    /// Edition country, e.g. `CA`
    pub country: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://news.google.com/rss/search".to_string(),
            limit: 8,
            timeout_secs: 5,
            ttl_secs: 1800,
            language: "en-CA".to_string(),
            country: "CA".to_string(),
        }
    }
}

impl NewsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Complete Pitwall configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub loader: LoaderConfig,
    pub cache: CacheConfig,
    pub news: NewsConfig,
}

impl Config {
    /// Default config file location (`~/.config/pitwall/config.toml` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "pitwall")?;
        Some(project_dirs.config_dir().join("config.toml"))
    }

    /// Loads configuration and applies environment overrides
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if a file is there, and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads and parses a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies overrides from an environment lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(API_BASE_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = base.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_upstream_behaviour() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.jolpi.ca");
        assert_eq!(config.api.prefix, "/ergast/f1");
        assert_eq!(config.api.timeout(), Duration::from_secs(12));
        assert_eq!(config.api.retry_statuses, vec![502, 503, 504]);
        assert_eq!(config.loader.page_size, 200);
        assert_eq!(config.loader.attempts, 3);
        assert_eq!(config.loader.backoff(), Duration::from_millis(600));
        assert_eq!(config.cache.collections_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.health_ttl(), Duration::from_secs(15));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [api]
            timeout_secs = 4

            [cache]
            collections_ttl_secs = 60
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.api.timeout_secs, 4);
        assert_eq!(config.api.prefix, "/ergast/f1");
        assert_eq!(config.cache.collections_ttl_secs, 60);
        assert_eq!(config.cache.drivers_menu_ttl_secs, 1800);
        assert_eq!(config.loader, LoaderConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = Config::from_toml_str("[api]\ntimeout_secs = \"soon\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("nope.toml");

        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_load_reads_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[loader]\npage_size = 50\n").unwrap();

        let config = Config::from_file(&path).expect("config should load");
        assert_eq!(config.loader.page_size, 50);
    }

    #[test]
    fn test_env_override_replaces_base_url() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| {
            (key == API_BASE_ENV).then(|| "http://localhost:8000".to_string())
        });
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_blank_env_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.api.base_url, "https://api.jolpi.ca");
    }
}

//! Configuration loading.
//!
//! Configuration is loaded from a TOML file with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `<config dir>/huginn/config.toml` (user, e.g. `~/.config/huginn/config.toml`)
//! 3. Built-in defaults
//!
//! Every key is optional. Command-line flags override what the file says.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::DEFAULT_BASE_URL;
use crate::cache::DEFAULT_USER_CACHE_SIZE;
use crate::sede::{DEFAULT_SEDE_QUERY_ID, DEFAULT_SEDE_URL};
use crate::types::DEFAULT_PAGE_SIZE;
use crate::{HuginnError, Result};

/// Client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub users: UsersConfig,
    #[serde(default)]
    pub sede: SedeConfig,
}

/// Stack Exchange API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API root (default: https://api.stackexchange.com/2.3).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Site id, e.g. `stackoverflow`. Required unless given on the command line.
    #[serde(default)]
    pub site: Option<String>,
    /// Application key.
    #[serde(default)]
    pub key: Option<String>,
    /// Filter for user requests (default: the built-in user filter).
    #[serde(default)]
    pub filter: Option<String>,
    /// Page size and vectored batch size (default: 100).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            site: None,
            key: None,
            filter: None,
            page_size: default_page_size(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_timeout() -> u64 {
    30
}

/// User resolution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersConfig {
    /// User cache capacity (default: 1000).
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    /// Emit a deleted-user placeholder for ids the API does not return.
    #[serde(default)]
    pub missing_assume_deleted: bool,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            cache_size: default_cache_size(),
            missing_assume_deleted: false,
        }
    }
}

fn default_cache_size() -> usize {
    DEFAULT_USER_CACHE_SIZE
}

/// Data explorer settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SedeConfig {
    #[serde(default = "default_sede_url")]
    pub base_url: String,
    /// Revision id of the bookmarkers query.
    #[serde(default = "default_sede_query")]
    pub query_id: String,
}

impl Default for SedeConfig {
    fn default() -> Self {
        Self {
            base_url: default_sede_url(),
            query_id: default_sede_query(),
        }
    }
}

fn default_sede_url() -> String {
    DEFAULT_SEDE_URL.to_string()
}

fn default_sede_query() -> String {
    DEFAULT_SEDE_QUERY_ID.to_string()
}

impl FromStr for Config {
    type Err = HuginnError;

    fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| HuginnError::Configuration(format!("Failed to parse config: {e}")))
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the user config file is
    /// used if present, and the defaults otherwise.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        Ok(Self::user_config_path().filter(|path| path.exists()))
    }

    /// `<config dir>/huginn/config.toml`, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("huginn").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.stackexchange.com/2.3");
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.api.site.is_none());
        assert_eq!(config.users.cache_size, 1000);
        assert!(!config.users.missing_assume_deleted);
        assert_eq!(config.sede.query_id, "1894927");
    }

    #[test]
    fn parse_minimal_config() {
        let config: Config = r#"
            [api]
            site = "meta"
        "#
        .parse()
        .unwrap();
        assert_eq!(config.api.site.as_deref(), Some("meta"));
        // Defaults preserved
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.users.cache_size, 1000);
    }

    #[test]
    fn parse_full_config() {
        let config: Config = r#"
            [api]
            base_url = "http://localhost:8080/2.3"
            site = "superuser"
            key = "app-key(("
            filter = "!custom"
            page_size = 25
            timeout_secs = 5

            [users]
            cache_size = 50
            missing_assume_deleted = true

            [sede]
            base_url = "http://localhost:8081"
            query_id = "42"
        "#
        .parse()
        .unwrap();
        assert_eq!(config.api.key.as_deref(), Some("app-key(("));
        assert_eq!(config.api.filter.as_deref(), Some("!custom"));
        assert_eq!(config.api.page_size, 25);
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.users.cache_size, 50);
        assert!(config.users.missing_assume_deleted);
        assert_eq!(config.sede.base_url, "http://localhost:8081");
        assert_eq!(config.sede.query_id, "42");
    }

    #[test]
    fn invalid_toml_is_a_configuration_error() {
        let err = "[api\nsite =".parse::<Config>().unwrap_err();
        assert!(matches!(err, HuginnError::Configuration(_)));
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nsite = \"askubuntu\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api.site.as_deref(), Some("askubuntu"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(HuginnError::Configuration(_))));
    }
}

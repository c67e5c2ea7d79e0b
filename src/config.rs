//! Configuration for vpcinv
//!
//! An explicit config struct passed to constructors; there is deliberately
//! no process-wide singleton. Loaded from YAML when a file exists, with
//! sensible defaults otherwise.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::fetch::METADATA_BASE_URL;
use crate::rpc::RPC_BASE_URL;

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/vpcinv.yaml";

/// Default working directory for cache and serial files
pub const DEFAULT_WORK_DIR: &str = "/var/lib/vpcinv";

fn default_work_dir() -> PathBuf {
    PathBuf::from(DEFAULT_WORK_DIR)
}

fn default_cache_ttl_secs() -> u64 {
    crate::inventory::cache::DEFAULT_TTL.as_secs()
}

fn default_metadata_url() -> String {
    METADATA_BASE_URL.to_string()
}

fn default_rpc_url() -> String {
    RPC_BASE_URL.to_string()
}

fn default_cli_binary() -> PathBuf {
    PathBuf::from("aws")
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Working directory for the cache file and serial counters
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Maximum cache age in seconds before a refresh is forced
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Instance metadata service base URL
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,

    /// Node inventory RPC base URL
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Provider CLI binary (name on PATH or absolute path)
    #[serde(default = "default_cli_binary")]
    pub cli_binary: PathBuf,

    /// Region override; auto-discovered from metadata when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            cache_ttl_secs: default_cache_ttl_secs(),
            metadata_url: default_metadata_url(),
            rpc_url: default_rpc_url(),
            cli_binary: default_cli_binary(),
            region: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist; the default path is optional and falls
    /// back to `Config::default()` when absent.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()).into());
                }
                Self::load_from(path)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load_from(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file
    #[allow(dead_code)]
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.metadata_url.is_empty() {
            return Err(ConfigError::Invalid("metadata_url must not be empty".to_string()).into());
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("work_dir must not be empty".to_string()).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.work_dir, PathBuf::from("/var/lib/vpcinv"));
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.cli_binary, PathBuf::from("aws"));
        assert!(config.region.is_none());
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.region = Some("eu-central-1".to_string());
        config.cache_ttl_secs = 60;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.region.as_deref(), Some("eu-central-1"));
        assert_eq!(loaded.cache_ttl_secs, 60);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "cache_ttl_secs: 30\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.cache_ttl_secs, 30);
        assert_eq!(config.work_dir, PathBuf::from("/var/lib/vpcinv"));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(Config::load_at(Some(missing.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "work_dir: [broken").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}

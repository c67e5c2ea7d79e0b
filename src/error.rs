//! Error types for the vpcinv CLI

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vpcinv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("instance not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Other(String),
}

/// Transport-level failures from the HTTP fetch primitive
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Failures from the provider CLI adapter
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("could not determine region from instance metadata")]
    RegionUnavailable,

    #[error("failed to run {binary}: {message}")]
    Spawn { binary: String, message: String },

    #[error("{binary} exited with status {code:?}")]
    NonZeroExit { binary: String, code: Option<i32> },

    #[error("{binary} produced no output")]
    EmptyOutput { binary: String },
}

/// Failures from the instance inventory cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file {path} is unavailable: {message}")]
    Unavailable { path: PathBuf, message: String },

    #[error("failed to parse cache file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to parse describe-instances response: {0}")]
    BadResponse(String),

    #[error("failed to persist cache file {path}: {message}")]
    Persist { path: PathBuf, message: String },

    #[error("VPC identity unavailable from instance metadata")]
    IdentityUnavailable,
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Failures from the advisory file-lock primitive
#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock on {path} is held by another process")]
    Held { path: PathBuf },

    #[error("failed to lock {path}: {message}")]
    Io { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_timeout_message() {
        let err = FetchError::Timeout {
            url: "http://169.254.169.254/latest/meta-data/vpc-id".to_string(),
        };
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("vpc-id"));
    }

    #[test]
    fn test_provider_error_non_zero_exit() {
        let err = ProviderError::NonZeroExit {
            binary: "aws".to_string(),
            code: Some(255),
        };
        let msg = err.to_string();
        assert!(msg.contains("aws"));
        assert!(msg.contains("255"));
    }

    #[test]
    fn test_provider_error_empty_output() {
        let err = ProviderError::EmptyOutput {
            binary: "aws".to_string(),
        };
        assert!(err.to_string().contains("no output"));
    }

    #[test]
    fn test_cache_error_unavailable() {
        let err = CacheError::Unavailable {
            path: PathBuf::from("/var/lib/vpcinv/instance_cache.yaml"),
            message: "No such file or directory".to_string(),
        };
        assert!(err.to_string().contains("instance_cache.yaml"));
    }

    #[test]
    fn test_lock_error_held() {
        let err = LockError::Held {
            path: PathBuf::from("/var/lib/vpcinv/refresh.lock"),
        };
        assert!(err.to_string().contains("another process"));
    }

    #[test]
    fn test_error_from_provider_error() {
        let err: Error = ProviderError::RegionUnavailable.into();
        match err {
            Error::Provider(ProviderError::RegionUnavailable) => (),
            _ => panic!("Expected Error::Provider(ProviderError::RegionUnavailable)"),
        }
    }

    #[test]
    fn test_error_from_cache_error() {
        let err: Error = CacheError::IdentityUnavailable.into();
        match err {
            Error::Cache(CacheError::IdentityUnavailable) => (),
            _ => panic!("Expected Error::Cache(CacheError::IdentityUnavailable)"),
        }
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}

//! Provider CLI adapter
//!
//! Runs the `aws` command-line tool for a region that is either configured
//! or auto-discovered from instance metadata. Failures are typed and logged;
//! no retries.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::RwLock;

use crate::error::ProviderError;
use crate::fetch::Metadata;

/// Provider command-line invocation seam.
///
/// The cache talks to the provider exclusively through this trait so its
/// refresh orchestration can be tested against canned CLI output.
#[async_trait]
pub trait ProviderCli: Send + Sync {
    /// Run the CLI with the given arguments, returning its stdout
    async fn run(&self, args: &[&str]) -> std::result::Result<String, ProviderError>;
}

/// `aws` CLI adapter with per-instance region memoization
pub struct AwsCli<M: Metadata> {
    binary: PathBuf,
    metadata: Arc<M>,
    region: RwLock<Option<String>>,
}

impl<M: Metadata> AwsCli<M> {
    /// Create an adapter.
    ///
    /// When `region` is `None` it is resolved once from the availability-zone
    /// metadata item on first use and remembered for the adapter's lifetime.
    pub fn new(binary: PathBuf, metadata: Arc<M>, region: Option<String>) -> Self {
        Self {
            binary,
            metadata,
            region: RwLock::new(region),
        }
    }

    /// Resolve the region, memoizing the result.
    ///
    /// The availability zone is the region plus a trailing zone letter
    /// (`us-east-1a` -> `us-east-1`). Resolution failure is an explicit
    /// error, never a partial string.
    pub async fn region(&self) -> std::result::Result<String, ProviderError> {
        if let Some(region) = self.region.read().await.as_deref() {
            return Ok(region.to_string());
        }

        let zone = self
            .metadata
            .item("placement/availability-zone")
            .await
            .map_err(|e| {
                log::error!("could not automatically determine region: {}", e);
                ProviderError::RegionUnavailable
            })?;

        let zone = zone.trim();
        if zone.len() < 2 || !zone.is_ascii() {
            log::error!("unusable availability zone {:?}", zone);
            return Err(ProviderError::RegionUnavailable);
        }
        let region = zone[..zone.len() - 1].to_string();

        *self.region.write().await = Some(region.clone());
        Ok(region)
    }
}

#[async_trait]
impl<M: Metadata> ProviderCli for AwsCli<M> {
    async fn run(&self, args: &[&str]) -> std::result::Result<String, ProviderError> {
        let region = self.region().await?;
        let binary = self.binary.display().to_string();
        log::info!("calling {} --region={} {}", binary, region, args.join(" "));

        let output = Command::new(&self.binary)
            .arg(format!("--region={}", region))
            .args(args)
            .output()
            .await
            .map_err(|e| ProviderError::Spawn {
                binary: binary.clone(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        // Check the actual exit status, not any proxy for it
        if !output.status.success() {
            log::error!(
                "{} {} failed with status {:?}",
                binary,
                args.join(" "),
                output.status.code()
            );
            log::error!(
                "output: {}{}",
                stdout,
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(ProviderError::NonZeroExit {
                binary,
                code: output.status.code(),
            });
        }

        if stdout.trim().is_empty() {
            log::error!("{} {} produced no output", binary, args.join(" "));
            return Err(ProviderError::EmptyOutput { binary });
        }

        Ok(stdout)
    }
}

#[cfg(test)]
pub mod testing {
    //! Canned provider CLI for cache orchestration tests

    use std::sync::Mutex;

    use super::*;

    /// Records every invocation and replays a fixed response
    pub struct MockProvider {
        response: Option<String>,
        pub calls: Mutex<Vec<Vec<String>>>,
    }

    impl MockProvider {
        /// Provider whose every run succeeds with `output`
        pub fn returning(output: &str) -> Self {
            Self {
                response: Some(output.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Provider whose every run fails
        pub fn failing() -> Self {
            Self {
                response: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProviderCli for MockProvider {
        async fn run(&self, args: &[&str]) -> std::result::Result<String, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|a| a.to_string()).collect());
            self.response
                .clone()
                .ok_or_else(|| ProviderError::NonZeroExit {
                    binary: "aws".to_string(),
                    code: Some(255),
                })
        }
    }
}

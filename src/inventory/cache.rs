//! On-disk instance inventory cache
//!
//! Owns the persisted snapshot, decides when it is stale, and regenerates it
//! by querying the provider CLI for the local VPC. Persistence is a temp file
//! plus an atomic rename, so any concurrent or crashed reader observes either
//! the old complete snapshot or the new one, never a torn write.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::error::{CacheError, Result};
use crate::fetch::Metadata;
use crate::inventory::{Snapshot, parse_describe_response};
use crate::provider::ProviderCli;

/// Canonical snapshot file name under the work directory
pub const CACHE_FILE: &str = "instance_cache.yaml";

/// Default maximum snapshot age before a refresh is forced
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// TTL-checked, atomically persisted inventory of the local VPC's instances
pub struct InstanceCache<M: Metadata, P: ProviderCli> {
    work_dir: PathBuf,
    ttl: Duration,
    metadata: Arc<M>,
    provider: P,
}

impl<M: Metadata, P: ProviderCli> InstanceCache<M, P> {
    pub fn new(work_dir: PathBuf, ttl: Duration, metadata: Arc<M>, provider: P) -> Self {
        log::info!("instance cache starting up, work dir {}", work_dir.display());
        Self {
            work_dir,
            ttl,
            metadata,
            provider,
        }
    }

    /// Path of the persisted snapshot file
    pub fn cache_path(&self) -> PathBuf {
        self.work_dir.join(CACHE_FILE)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Wall-clock age of the persisted snapshot, `None` when there is none
    pub fn file_age(&self) -> Option<Duration> {
        let modified = fs::metadata(self.cache_path()).ok()?.modified().ok()?;
        // A file stamped in the future counts as just written
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    /// Missing or older than the TTL
    pub fn is_stale(&self) -> bool {
        match self.file_age() {
            None => true,
            Some(age) => age > self.ttl,
        }
    }

    /// Return the current snapshot, refreshing it first if it is stale.
    ///
    /// A failed refresh is absorbed when a previously persisted snapshot
    /// still exists: slightly stale data beats no data. With no file to fall
    /// back on the failure is fatal to the load.
    pub async fn load(&self) -> Result<Snapshot> {
        if self.is_stale() {
            if let Err(err) = self.refresh().await {
                log::warn!("refresh failed, serving existing cache if any: {}", err);
            }
        }
        self.read_snapshot()
    }

    /// Deserialize the persisted snapshot file as-is
    pub fn read_snapshot(&self) -> Result<Snapshot> {
        let path = self.cache_path();
        log::info!("loading cache {}", path.display());

        let yaml = fs::read_to_string(&path).map_err(|e| CacheError::Unavailable {
            path: path.clone(),
            message: e.to_string(),
        })?;
        log::debug!("cache contents: {}", yaml);

        let snapshot = serde_yaml::from_str(&yaml).map_err(|e| CacheError::Parse {
            path,
            message: e.to_string(),
        })?;
        Ok(snapshot)
    }

    /// Regenerate the persisted snapshot from the provider.
    ///
    /// Any failure aborts with the previously persisted state untouched.
    pub async fn refresh(&self) -> Result<()> {
        log::info!("updating {}", self.cache_path().display());

        let vpc_id = self.vpc_id().await?;
        let filter = format!("Name=vpc-id,Values={}", vpc_id);
        let json = self
            .provider
            .run(&["ec2", "describe-instances", "--filters", filter.as_str()])
            .await?;

        let snapshot = parse_describe_response(&json)?;
        self.persist(&snapshot)
    }

    /// Resolve the local VPC id: primary interface MAC first, then the
    /// vpc-id item for that MAC.
    async fn vpc_id(&self) -> Result<String> {
        let macs = self.metadata.item("network/interfaces/macs/").await?;
        let primary_mac = macs
            .lines()
            .next()
            .map(|line| line.trim().trim_end_matches('/'))
            .filter(|mac| !mac.is_empty())
            .ok_or(CacheError::IdentityUnavailable)?
            .to_string();

        let vpc_id = self
            .metadata
            .item(&format!("network/interfaces/macs/{}/vpc-id", primary_mac))
            .await?;
        let vpc_id = vpc_id.trim().to_string();
        if vpc_id.is_empty() {
            return Err(CacheError::IdentityUnavailable.into());
        }
        Ok(vpc_id)
    }

    /// Serialize to a temp file in the same directory, then rename over the
    /// canonical path. The rename is the commit point.
    fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(&self.work_dir)?;

        let path = self.cache_path();
        let tmp = self.work_dir.join(format!("{}.tmp", CACHE_FILE));

        let yaml = serde_yaml::to_string(snapshot).map_err(|e| CacheError::Persist {
            path: path.clone(),
            message: e.to_string(),
        })?;

        log::info!("writing cache file {}", tmp.display());
        fs::write(&tmp, yaml).map_err(|e| CacheError::Persist {
            path: tmp.clone(),
            message: e.to_string(),
        })?;

        log::info!("moving {} to {}", tmp.display(), path.display());
        fs::rename(&tmp, &path).map_err(|e| CacheError::Persist {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }
}

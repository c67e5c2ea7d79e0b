//! Command execution context
//!
//! Builds the configured cache and collaborators once per invocation and
//! hands them to command handlers.

use std::sync::Arc;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::MetadataClient;
use crate::inventory::InstanceCache;
use crate::provider::AwsCli;

/// Context for command execution containing config and the wired-up cache
pub struct CommandContext {
    /// Effective configuration after CLI overrides
    pub config: Config,
    /// Instance inventory cache backed by the real metadata service and CLI
    pub cache: InstanceCache<MetadataClient, AwsCli<MetadataClient>>,
}

impl CommandContext {
    /// Load config, apply CLI overrides, and wire up the component graph
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = Config::load_at(cli.config.as_deref())?;

        if let Some(ref work_dir) = cli.work_dir {
            config.work_dir = work_dir.into();
        }
        if let Some(ttl) = cli.ttl {
            config.cache_ttl_secs = ttl;
        }
        if let Some(ref region) = cli.region {
            config.region = Some(region.clone());
        }
        if let Some(ref metadata_url) = cli.metadata_url {
            config.metadata_url = metadata_url.clone();
        }

        let metadata =
            Arc::new(MetadataClient::with_base_url(config.metadata_url.clone()).map_err(Error::Fetch)?);
        let provider = AwsCli::new(
            config.cli_binary.clone(),
            Arc::clone(&metadata),
            config.region.clone(),
        );
        let cache = InstanceCache::new(
            config.work_dir.clone(),
            config.cache_ttl(),
            metadata,
            provider,
        );

        Ok(Self { config, cache })
    }
}

//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod context;
pub mod inventory;
pub mod maintenance;

pub use context::CommandContext;

/// Output format options
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format - one row per instance (default)
    #[default]
    Table,
    /// JSON format - structured for scripts
    Json,
    /// YAML format - matches the on-disk cache shape
    Yaml,
}

/// vpcinv - locally cached inventory of the EC2 instances in this VPC
#[derive(Parser, Debug)]
#[command(name = "vpcinv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, yaml)
    #[arg(
        long,
        global = true,
        env = "VPCINV_FORMAT",
        default_value = "table",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "VPCINV_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override working directory for cache and serial files
    #[arg(long, global = true, env = "VPCINV_WORK_DIR", hide_env = true)]
    pub work_dir: Option<String>,

    /// Override cache TTL in seconds
    #[arg(long, global = true, env = "VPCINV_TTL", hide_env = true)]
    pub ttl: Option<u64>,

    /// Override the region instead of discovering it from metadata
    #[arg(long, global = true, env = "VPCINV_REGION", hide_env = true)]
    pub region: Option<String>,

    /// Override instance metadata service base URL
    #[arg(long, global = true, env = "VPCINV_METADATA_URL", hide_env = true)]
    pub metadata_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "VPCINV_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List instances in the local VPC
    List,

    /// Show one instance by id
    Get {
        /// Instance identifier, e.g. i-0abc1234
        instance_id: String,
    },

    /// Force a cache refresh regardless of TTL
    Refresh,

    /// Show cache location, age and freshness
    Status,

    /// Allocate the next friendly name for a host kind
    Name {
        /// Host kind, e.g. web or db
        kind: String,
    },

    /// List nodes registered with the local inventory RPC service
    Nodes,
}

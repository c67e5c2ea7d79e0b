//! Cache maintenance commands: refresh, status, name

use chrono::{DateTime, Local};

use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::lock::Lockfile;
use crate::serial::next_friendly_name;

/// Lock taken by forced refreshes so cron-driven runs do not stack up
const REFRESH_LOCK: &str = "refresh.lock";

/// Force a cache refresh regardless of TTL
pub async fn refresh(ctx: &CommandContext) -> Result<()> {
    std::fs::create_dir_all(&ctx.config.work_dir)?;
    let lock = Lockfile::acquire(ctx.config.work_dir.join(REFRESH_LOCK))?;

    ctx.cache.refresh().await?;
    let snapshot = ctx.cache.read_snapshot()?;
    lock.release()?;

    println!("Cache refreshed: {} instances", snapshot.len());
    Ok(())
}

/// Show cache location, age and freshness
pub fn status(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let path = ctx.cache.cache_path();
    let age_secs = ctx.cache.file_age().map(|age| age.as_secs());
    let ttl_secs = ctx.cache.ttl().as_secs();
    let stale = ctx.cache.is_stale();
    let entries = ctx.cache.read_snapshot().map(|s| s.len()).ok();

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let json = serde_json::json!({
                "cache_file": path.display().to_string(),
                "present": age_secs.is_some(),
                "age_secs": age_secs,
                "ttl_secs": ttl_secs,
                "stale": stale,
                "entries": entries,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            println!("Cache Status");
            println!("────────────────────────────────────────");
            println!("Cache file:  {}", path.display());

            match age_secs {
                Some(age) => {
                    println!("Age:         {}s (TTL {}s)", age, ttl_secs);
                    if let Some(updated) = last_updated(&path) {
                        println!("Updated:     {}", updated);
                    }
                    if let Some(entries) = entries {
                        println!("Instances:   {}", entries);
                    }
                    println!(
                        "Freshness:   {}",
                        if stale {
                            "stale (next read refreshes)"
                        } else {
                            "fresh"
                        }
                    );
                }
                None => {
                    println!("Age:         no cache file (TTL {}s)", ttl_secs);
                    println!("Freshness:   missing (next read refreshes)");
                }
            }
        }
    }
    Ok(())
}

/// Allocate the next friendly name for a host kind
pub fn name(ctx: &CommandContext, kind: &str) -> Result<()> {
    let name = next_friendly_name(&ctx.config.work_dir, kind)?;
    println!("{}", name);
    Ok(())
}

fn last_updated(path: &std::path::Path) -> Option<String> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let stamp: DateTime<Local> = modified.into();
    Some(stamp.format("%Y-%m-%d %H:%M:%S").to_string())
}

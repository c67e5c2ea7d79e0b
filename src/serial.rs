//! Friendly-name serial counters
//!
//! Allocates `kind-N` names by bumping a per-kind counter persisted under
//! the work directory, e.g. `web.serial` -> `web-7`.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Allocate the next friendly name for a host kind.
///
/// An unreadable or garbled counter file restarts the sequence at 1.
pub fn next_friendly_name(work_dir: &Path, kind: &str) -> Result<String> {
    let serial_file = work_dir.join(format!("{}.serial", kind));

    let prev = fs::read_to_string(&serial_file)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let serial = prev + 1;

    fs::create_dir_all(work_dir)?;
    fs::write(&serial_file, serial.to_string())?;
    log::info!("allocated friendly name {}-{}", kind, serial);

    Ok(format!("{}-{}", kind, serial))
}

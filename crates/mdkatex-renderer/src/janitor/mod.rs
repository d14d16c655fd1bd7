//! Retention sweeps over the render cache directory.
//!
//! The janitor lists the whole directory on every sweep, which is adequate
//! for the fragment counts a document build produces. Failures are logged
//! and swallowed: a sweep never fails the render that triggered it.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

/// Tracing target for janitor operations.
const JANITOR_TARGET: &str = "mdkatex_renderer::janitor";

/// Default retention window for cache entries: 24 hours.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Deletes regular files in `directory` not modified within `retention`.
///
/// Returns the number of files removed.
#[must_use]
pub fn sweep(directory: &Path, retention: Duration) -> usize {
    sweep_at(directory, retention, SystemTime::now())
}

/// Variant of [`sweep`] measured against an explicit `now`.
///
/// A file is removed when its modification time is strictly earlier than
/// `now - retention`. Subdirectories and other non-regular entries are left
/// alone.
#[must_use]
pub fn sweep_at(directory: &Path, retention: Duration, now: SystemTime) -> usize {
    let Some(cutoff) = now.checked_sub(retention) else {
        return 0;
    };

    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(error) => {
            debug!(
                target: JANITOR_TARGET,
                directory = %directory.display(),
                %error,
                "cache directory not readable, skipping sweep"
            );
            return 0;
        }
    };

    let mut removed = 0_usize;
    for entry in entries.flatten() {
        let path = entry.path();
        let modified = match entry.metadata() {
            Ok(metadata) if metadata.is_file() => metadata.modified(),
            Ok(_) => continue,
            Err(error) => Err(error),
        };
        match modified {
            Ok(modified) if modified < cutoff => match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(error) => warn!(
                    target: JANITOR_TARGET,
                    path = %path.display(),
                    %error,
                    "failed to remove expired cache entry"
                ),
            },
            Ok(_) => {}
            Err(error) => warn!(
                target: JANITOR_TARGET,
                path = %path.display(),
                %error,
                "failed to read cache entry metadata"
            ),
        }
    }
    removed
}

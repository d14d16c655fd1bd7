//! Built-in defaults applied when no configuration layer sets a value.

use std::env;

use camino::Utf8PathBuf;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default renderer command name.
pub const DEFAULT_COMMAND_NAME: &str = "katex";

/// Default retention window for cache entries: 24 hours.
pub const DEFAULT_RETENTION_SECS: u64 = 24 * 60 * 60;

/// Default cap on a single renderer invocation.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Name of the cache subdirectory created under the OS temp directory.
const CACHE_SUBDIR: &str = "mdkatex";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Computes the shared cache directory under the OS temp directory.
#[must_use]
pub fn default_cache_dir() -> Utf8PathBuf {
    let base = Utf8PathBuf::from_path_buf(env::temp_dir())
        .unwrap_or_else(|_| Utf8PathBuf::from("/tmp"));
    base.join(CACHE_SUBDIR)
}

/// Computes the bundled binaries directory next to the running executable.
///
/// Falls back to a relative `bin` directory when the executable location is
/// unavailable or not valid UTF-8.
#[must_use]
pub fn default_bundle_dir() -> Utf8PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(std::path::Path::to_path_buf))
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        .map_or_else(|| Utf8PathBuf::from("bin"), |dir| dir.join("bin"))
}

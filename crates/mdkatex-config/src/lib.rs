//! Shared configuration for the mdkatex toolchain.
//!
//! [`Config`] is loaded through `ortho_config`, which layers command-line
//! flags over `MDKATEX_*` environment variables, configuration files, and
//! finally the built-in defaults in [`defaults`]. Every field is optional so
//! that an absent layer never masks a lower one; the accessor methods apply
//! the defaults.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_COMMAND_NAME, DEFAULT_LOG_FILTER, DEFAULT_RETENTION_SECS, DEFAULT_TIMEOUT_SECS,
    default_bundle_dir, default_cache_dir, default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration shared by the CLI and the renderer core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "MDKATEX")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `mdkatex_renderer=debug`.
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Output format for log records.
    #[serde(default)]
    pub log_format: Option<LogFormat>,
    /// Directory holding rendered fragments and the resolution file.
    #[serde(default)]
    pub cache_dir: Option<Utf8PathBuf>,
    /// Seconds a cache entry may go unused before the janitor removes it.
    #[serde(default)]
    pub retention_secs: Option<u64>,
    /// Seconds a single renderer invocation may run before it is killed.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Directory scanned for bundled renderer binaries.
    #[serde(default)]
    pub bundle_dir: Option<Utf8PathBuf>,
    /// Name of the renderer command looked up on the search path.
    #[serde(default)]
    pub command_name: Option<String>,
}

impl Config {
    /// Returns the configured log filter or [`DEFAULT_LOG_FILTER`].
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Returns the configured log format or the JSON default.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Returns the cache directory, defaulting to `<temp>/mdkatex`.
    #[must_use]
    pub fn cache_dir(&self) -> Utf8PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }

    /// Returns the retention window for cache entries.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs.unwrap_or(DEFAULT_RETENTION_SECS))
    }

    /// Returns the timeout applied to each renderer invocation.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Returns the bundled binaries directory, defaulting to `<exe dir>/bin`.
    #[must_use]
    pub fn bundle_dir(&self) -> Utf8PathBuf {
        self.bundle_dir.clone().unwrap_or_else(default_bundle_dir)
    }

    /// Returns the renderer command name.
    #[must_use]
    pub fn command_name(&self) -> &str {
        self.command_name.as_deref().unwrap_or(DEFAULT_COMMAND_NAME)
    }
}

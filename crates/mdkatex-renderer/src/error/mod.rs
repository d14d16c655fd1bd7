//! Domain errors raised by renderer operations.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can branch on the failure kind. I/O errors are wrapped in `Arc` to satisfy
//! the `result_large_err` Clippy lint and keep the errors cloneable.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while locating a renderer executable.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// No candidate on the search path answered a version query and no
    /// bundled binary matches the current platform.
    #[error(
        "platform not supported ({arch}-{os}), katex binary not found. \
         Install manually using 'npm install katex'."
    )]
    RendererNotFound {
        /// Operating system name used for the bundle lookup.
        os: String,
        /// Normalised architecture name used for the bundle lookup.
        arch: String,
    },
}

/// Why a single render failed.
#[derive(Debug, Clone, Error)]
pub enum RenderFailure {
    /// The renderer exited with a positive status code.
    #[error("katex exited with status {code}: {output}")]
    NonZeroExit {
        /// Process exit status.
        code: i32,
        /// Combined stdout and stderr, trimmed.
        output: String,
    },

    /// The renderer was terminated by a signal.
    #[error("katex process ended with code -{signal} ({name})")]
    Signaled {
        /// Signal number.
        signal: i32,
        /// Canonical signal name, for example `SIGTERM`.
        name: String,
    },

    /// The renderer process could not be started.
    #[error("failed to launch katex: {source}")]
    LaunchFailure {
        /// Underlying OS error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The renderer did not finish within the configured timeout.
    #[error("katex timed out after {}ms and was killed", .timeout.as_millis())]
    TimedOut {
        /// Configured timeout.
        timeout: Duration,
    },

    /// The renderer reported success without writing its output file.
    #[error("katex produced no output at '{}'", .path.display())]
    MissingOutput {
        /// Output path the renderer was asked to write.
        path: PathBuf,
    },

    /// Reading or writing a cache or temp file failed.
    #[error("cache I/O error at '{}': {source}", .path.display())]
    CacheIo {
        /// File involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl RenderFailure {
    /// Wraps an I/O error raised while touching `path`.
    pub(crate) fn cache_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheIo {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

/// A failed render, carrying the offending input for debuggability.
#[derive(Debug, Clone, Error)]
#[error("Error processing '{input}': {failure}")]
pub struct RenderError {
    /// The math source that failed to render.
    pub input: String,
    /// Diagnostic detail.
    #[source]
    pub failure: RenderFailure,
}

impl RenderError {
    /// Builds an error for `input`.
    #[must_use]
    pub fn new(input: impl Into<String>, failure: RenderFailure) -> Self {
        Self {
            input: input.into(),
            failure,
        }
    }
}

/// Errors surfaced by [`Renderer::render`](crate::Renderer::render).
#[derive(Debug, Clone, Error)]
pub enum RendererError {
    /// No usable renderer was found.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The renderer ran but the render failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

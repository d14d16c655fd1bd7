//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use mdkatex_renderer::{RendererError, ResolveError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("invalid render option '{0}': expected NAME or NAME=VALUE")]
    InvalidOption(String),
    #[error("failed to read TeX from stdin: {0}")]
    ReadInput(io::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Renderer(#[from] RendererError),
}

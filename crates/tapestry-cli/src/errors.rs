//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use tapestry_graph::GraphError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("cannot resolve {path}: {source}")]
    ResolvePath { path: Utf8PathBuf, source: io::Error },
    #[error("a root symbol or a --line/--column position must be provided")]
    MissingRoot,
    #[error(transparent)]
    Analysis(#[from] GraphError),
    #[error("failed to serialise graph: {0}")]
    Serialise(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}

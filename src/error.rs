//! Errors that reject a whole run. Per-file problems are
//! [`Diagnostic`](crate::model::Diagnostic)s instead.

use crate::config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("failed to write {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render {format} output: {message}")]
    Format { format: String, message: String },

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Stable machine-checkable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(e) => e.kind(),
            Error::Discovery(_) => "DiscoveryError",
            Error::Render { .. } | Error::Format { .. } => "RenderError",
            Error::Task(_) => "TaskError",
        }
    }
}

/// A glob pattern that could not be expanded.
#[derive(Debug, Error)]
#[error("invalid glob pattern \"{pattern}\": {message}")]
pub struct DiscoveryError {
    pub pattern: String,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, Error>;

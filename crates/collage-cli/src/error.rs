use std::path::PathBuf;

use collage_layout::{LayoutConfigError, TraceError, UploadError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse trace JSON: {0}")]
    TraceParse(#[from] serde_json::Error),
    #[error("trace rejected: {0}")]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Config(#[from] LayoutConfigError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("invalid piece spec `{spec}`: {reason}")]
    InvalidPieceSpec { spec: String, reason: String },
    #[error("piece id space exhausted")]
    IdSpaceExhausted,
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidPieceSpec { .. } => 2,
            Self::Io { .. } | Self::Output(_) => 3,
            Self::TraceParse(_) | Self::Trace(_) => 4,
            Self::Config(_) => 5,
            Self::Upload(_) => 6,
            Self::IdSpaceExhausted => 7,
        }
    }

    pub fn invalid_spec(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPieceSpec {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

use std::path::PathBuf;

use thiserror::Error;

/// All errors produced by voxprep-core.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("malformed audio in {path}: {reason}")]
    MalformedAudio { path: PathBuf, reason: String },

    #[error("wav encode error: {0}")]
    Encode(String),

    #[error("resampler error: {0}")]
    Resample(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;

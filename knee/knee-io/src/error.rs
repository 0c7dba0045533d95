//! Error types for mesh and telemetry I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// The file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The file exists but its content is not valid.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Creates an [`IoError::InvalidContent`] from any message.
    #[must_use]
    pub fn invalid_content(msg: impl Into<String>) -> Self {
        Self::InvalidContent(msg.into())
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

//! Error types for session persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing the session.
#[derive(Debug, Error)]
pub enum Error {
    /// The session file could not be read or written.
    #[error("session file {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The session file is not valid JSON for the session layout.
    #[error("session file {path} is corrupt: {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Neither `STRATUS_HOME` nor a user home directory is available.
    #[error("could not determine a home directory; set STRATUS_HOME")]
    NoHome,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

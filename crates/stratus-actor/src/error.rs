//! Error types for resource operations.

use stratus_api::ApiError;
use thiserror::Error;

/// Errors returned by [`crate::Actor`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input rejected before any request was made.
    #[error("incorrect usage: {0}")]
    InvalidArgument(String),

    /// No service broker has the requested name.
    #[error("service broker '{name}' not found")]
    ServiceBrokerNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// No buildpack has the requested name.
    #[error("buildpack '{name}' not found")]
    BuildpackNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// The control plane call failed; passed through as is.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// Returns true if a name lookup matched nothing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ServiceBrokerNotFound { .. } | Self::BuildpackNotFound { .. }
        )
    }
}

/// Result type alias for actor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Rejects blank values for a named argument.
pub(crate) fn require(argument: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{argument} must not be empty")));
    }
    Ok(())
}

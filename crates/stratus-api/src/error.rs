//! Errors surfaced by the control-plane client.

use thiserror::Error;

/// Errors that can occur while talking to the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The endpoint presented a certificate that could not be trusted.
    #[error("invalid SSL certificate for {host}: {reason}")]
    Tls {
        /// Host whose certificate was rejected.
        host: String,
        /// Reason reported by the TLS layer.
        reason: String,
    },

    /// The authorization server rejected the submitted credentials.
    #[error("credentials were rejected")]
    InvalidCredentials,

    /// The access token is missing, expired or revoked.
    #[error("not authorized: {description}")]
    Unauthorized {
        /// Description returned by the server.
        description: String,
    },

    /// The control plane answered with an error response.
    #[error("{description}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Platform error code, if the body carried one.
        code: Option<u32>,
        /// Human-readable description.
        description: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The client was asked to do something it cannot express.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A call was issued before an endpoint was selected.
    #[error("no API endpoint set")]
    NotConnected,
}

impl ApiError {
    /// Builds a remote error from a status code and description.
    #[must_use]
    pub fn remote(status: u16, description: impl Into<String>) -> Self {
        Self::Remote {
            status,
            code: None,
            description: description.into(),
        }
    }

    /// Returns true if the error is a certificate trust failure.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls { .. })
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

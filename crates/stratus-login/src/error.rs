//! Error types for the login flow.

use stratus_api::ApiError;
use thiserror::Error;

/// Remediation shown with [`Error::TlsValidation`].
pub const SKIP_SSL_HINT: &str =
    "Use 'stratus login --skip-ssl-validation' to continue with an insecure API endpoint";

/// Errors that end a login, logout, api or target flow.
#[derive(Debug, Error)]
pub enum Error {
    /// Conflicting or missing flags, detected before any request.
    #[error("Incorrect Usage: {0}")]
    Usage(String),

    /// The endpoint's certificate is not trusted.
    #[error("Invalid SSL Cert for {host}")]
    TlsValidation {
        /// Host that presented the certificate.
        host: String,
    },

    /// The authorization server rejected the credentials.
    #[error("Credentials were rejected, please try again.")]
    Authentication {
        /// Endpoint the attempt was made against, for retries.
        endpoint: String,
    },

    /// A service account session blocks a human login.
    #[error(
        "Service account currently logged in. Use 'stratus logout' to log out service account and try again."
    )]
    SessionConflict,

    /// The named organization is not visible to the user.
    #[error("Organization '{name}' not found.")]
    OrganizationNotFound {
        /// Requested name.
        name: String,
    },

    /// The named space does not exist in the organization.
    #[error("Space '{name}' not found.")]
    SpaceNotFound {
        /// Requested name.
        name: String,
    },

    /// The operator interrupted the flow.
    #[error("cancelled")]
    Cancelled,

    /// A control-plane call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be read or written.
    #[error(transparent)]
    Session(#[from] stratus_session::Error),

    /// Reading operator input failed.
    #[error("failed to read input: {0}")]
    Prompt(String),
}

impl Error {
    /// Follow-up advice to print after the message, if any.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::TlsValidation { .. } => Some(SKIP_SSL_HINT),
            _ => None,
        }
    }

    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

/// Result type alias for login operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_errors_carry_remediation() {
        let err = Error::TlsValidation {
            host: "api.example.com".into(),
        };
        assert_eq!(err.to_string(), "Invalid SSL Cert for api.example.com");
        assert_eq!(err.hint(), Some(SKIP_SSL_HINT));
        assert!(Error::Cancelled.hint().is_none());
    }

    #[test]
    fn api_errors_are_transparent() {
        let err = Error::from(ApiError::remote(500, "server exploded"));
        assert_eq!(err.to_string(), "server exploded");
    }
}

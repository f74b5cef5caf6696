//! CLI error types.

use std::io;

use thiserror::Error;

/// Exit status for an operator interrupt.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Errors that end a stratus command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command needs a logged-in session.
    #[error("Not logged in. Use 'stratus login' to log in.")]
    NotLoggedIn,

    /// The command needs a targeted space.
    #[error("No space targeted. Use 'stratus target -s SPACE' to target a space.")]
    NoSpaceTargeted,

    /// The operator interrupted the command.
    #[error("cancelled")]
    Cancelled,

    /// A login, logout, api or target flow failed.
    #[error(transparent)]
    Login(#[from] stratus_login::Error),

    /// A resource operation failed.
    #[error(transparent)]
    Actor(#[from] stratus_actor::Error),

    /// A control-plane call failed outside any flow.
    #[error(transparent)]
    Api(#[from] stratus_api::ApiError),

    /// The session file could not be read or written.
    #[error(transparent)]
    Session(#[from] stratus_session::Error),

    /// Output formatting failed.
    #[error("format error: {0}")]
    Format(String),

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Cancelled | Self::Login(stratus_login::Error::Cancelled) => EXIT_INTERRUPTED,
            _ => 1,
        }
    }

    /// Follow-up advice printed after the message, if any.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Login(err) => err.hint(),
            _ => None,
        }
    }
}

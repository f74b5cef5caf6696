//! Login credentials and the tokens they are exchanged for.
//!
//! Secret material is held in [`Zeroizing`] buffers so it is wiped on drop,
//! and `Debug` output never prints it.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Placeholder printed instead of secret values.
const REDACTED: &str = "[REDACTED]";

/// The credentials submitted for one login attempt.
///
/// Exactly one variant is active per attempt.
#[derive(Clone)]
pub enum Credentials {
    /// Username and password of a human user.
    Password {
        /// Login name.
        username: String,
        /// Password.
        password: Zeroizing<String>,
    },
    /// Single sign-on selected without a passcode yet.
    ///
    /// This is a selection tag only and is never sent to the token endpoint.
    /// The login flow prompts for the passcode and submits
    /// [`Credentials::SsoPasscode`] instead, recording [`AuthMethod::Sso`] on
    /// the session.
    Sso,
    /// One-time passcode obtained from the single sign-on page.
    SsoPasscode {
        /// The passcode.
        passcode: Zeroizing<String>,
    },
    /// Service account identity.
    ClientCredentials {
        /// Client identifier.
        client_id: String,
        /// Client secret.
        client_secret: Zeroizing<String>,
    },
}

impl Credentials {
    /// Username/password credentials.
    #[must_use]
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// One-time passcode credentials.
    #[must_use]
    pub fn sso_passcode(passcode: impl Into<String>) -> Self {
        Self::SsoPasscode {
            passcode: Zeroizing::new(passcode.into()),
        }
    }

    /// Client credentials for a service account.
    #[must_use]
    pub fn client(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::ClientCredentials {
            client_id: client_id.into(),
            client_secret: Zeroizing::new(client_secret.into()),
        }
    }

    /// The method these credentials authenticate with.
    #[must_use]
    pub const fn method(&self) -> AuthMethod {
        match self {
            Self::Password { .. } => AuthMethod::Password,
            Self::Sso => AuthMethod::Sso,
            Self::SsoPasscode { .. } => AuthMethod::SsoPasscode,
            Self::ClientCredentials { .. } => AuthMethod::ClientCredentials,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
            Self::Sso => f.write_str("Sso"),
            Self::SsoPasscode { .. } => f
                .debug_struct("SsoPasscode")
                .field("passcode", &REDACTED)
                .finish(),
            Self::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &REDACTED)
                .finish(),
        }
    }
}

/// How a session was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Username and password.
    Password,
    /// Single sign-on.
    Sso,
    /// Single sign-on passcode supplied directly.
    SsoPasscode,
    /// Service account client credentials.
    ClientCredentials,
}

impl AuthMethod {
    /// Returns true for methods that authenticate a human user.
    #[must_use]
    pub const fn is_human(self) -> bool {
        !matches!(self, Self::ClientCredentials)
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password => write!(f, "password"),
            Self::Sso => write!(f, "sso"),
            Self::SsoPasscode => write!(f, "sso-passcode"),
            Self::ClientCredentials => write!(f, "client-credentials"),
        }
    }
}

/// Access and refresh tokens issued by the authorization server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Token used to obtain a new access token; absent for client credentials.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type, normally `bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenPair {
    /// The value of the `Authorization` header for this token.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{} {}", capitalize(&self.token_type), self.access_token)
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &REDACTED)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("token_type", &self.token_type)
            .finish()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

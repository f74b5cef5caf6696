//! Runtime settings derived from flags and environment variables.

use std::path::PathBuf;
use std::time::Duration;

use stratus_api::{HttpClient, HttpClientConfig, TraceConfig};
use stratus_session::{FileSessionStore, Session};

use crate::cli::Cli;
use crate::error::CliError;

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Directory holding `.stratus/`, or the user's home when unset.
    pub home: Option<PathBuf>,
    /// Request tracing.
    pub trace: TraceConfig,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Settings {
    /// Reads settings from parsed arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            home: cli.home.clone(),
            trace: TraceConfig::parse(cli.trace.as_deref()),
            timeout: Duration::from_secs(cli.timeout.max(1)),
        }
    }

    /// HTTP client configuration for these settings.
    #[must_use]
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: self.timeout,
            trace: self.trace.clone(),
            ..HttpClientConfig::default()
        }
    }

    /// The session file store.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn session_store(&self) -> Result<FileSessionStore, CliError> {
        Ok(FileSessionStore::in_home(self.home.as_deref())?)
    }

    /// A client with no endpoint selected, for the login flows.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(&self) -> Result<HttpClient, CliError> {
        Ok(HttpClient::new(self.http_config())?)
    }

    /// A client carrying the endpoint and tokens of a saved login.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotLoggedIn`] when the session has no endpoint or
    /// no tokens.
    pub fn authenticated_client(&self, session: &Session) -> Result<HttpClient, CliError> {
        let (Some(target), Some(tokens)) = (session.target(), session.tokens()) else {
            return Err(CliError::NotLoggedIn);
        };
        Ok(HttpClient::for_target(
            self.http_config(),
            target,
            session.endpoint_info(),
            Some(tokens),
        )?)
    }
}

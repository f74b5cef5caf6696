//! Login, auth, logout, api and target commands.

use std::io::Write;

use stratus_api::ControlPlaneClient;
use stratus_login::{CredentialResolver, LoginRequest, Prompter};
use stratus_session::SessionStore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::cli::{ApiArgs, AuthArgs, LoginArgs, TargetArgs};
use crate::error::CliError;
use crate::output::{OutputFormat, TargetSummary, write_warnings};

/// Interactive login gives up after this many rejected attempts.
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Commands that change the saved session.
///
/// Results go to `out`; warnings go to `err` as soon as each flow finishes,
/// before any error is reported.
pub struct SessionCommand<C, S, P> {
    resolver: CredentialResolver<C, S, P>,
}

impl<C, S, P> SessionCommand<C, S, P>
where
    C: ControlPlaneClient,
    S: SessionStore,
    P: Prompter,
{
    /// Create a new session command.
    #[must_use]
    pub const fn new(resolver: CredentialResolver<C, S, P>) -> Self {
        Self { resolver }
    }

    /// Runs `stratus login`.
    ///
    /// Prompted credentials that are rejected are asked for again, up to
    /// [`MAX_LOGIN_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub async fn login<W: Write, E: Write>(
        &mut self,
        out: &mut W,
        err: &mut E,
        format: &OutputFormat,
        args: &LoginArgs,
    ) -> Result<(), CliError> {
        let mut request = login_request(args);
        let retryable = args.password.is_none() && args.sso_passcode.is_none();

        let mut attempt = 1;
        loop {
            let outcome = self.resolver.login(&request).await;
            write_warnings(err, &outcome.warnings)?;
            match outcome.result {
                Ok(session) => {
                    format.status(out, "OK")?;
                    return format.write(out, &TargetSummary::from(&session));
                }
                Err(stratus_login::Error::Authentication { endpoint })
                    if retryable && attempt < MAX_LOGIN_ATTEMPTS =>
                {
                    debug!(attempt, "credentials rejected, asking again");
                    writeln!(err, "Credentials were rejected, please try again.")?;
                    request.endpoint = Some(endpoint);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Runs `stratus auth`: one non-interactive attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the login fails.
    pub async fn auth<W: Write, E: Write>(
        &mut self,
        out: &mut W,
        err: &mut E,
        format: &OutputFormat,
        args: &AuthArgs,
    ) -> Result<(), CliError> {
        let request = LoginRequest {
            username: Some(args.username.clone()),
            password: Some(Zeroizing::new(args.password.clone())),
            client_credentials: args.client_credentials,
            interactive: false,
            ..LoginRequest::default()
        };
        let outcome = self.resolver.login(&request).await;
        write_warnings(err, &outcome.warnings)?;
        let session = outcome.result?;
        format.status(out, "OK")?;
        format.write(out, &TargetSummary::from(&session))
    }

    /// Runs `stratus logout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be saved.
    pub fn logout<W: Write>(&self, out: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        format.status(out, "Logging out...")?;
        let session = self.resolver.logout()?;
        format.status(out, "OK")?;
        if format.is_json() {
            format.write(out, &TargetSummary::from(&session))?;
        }
        Ok(())
    }

    /// Runs `stratus api`: shows the endpoint, or switches to a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached or the session
    /// cannot be saved.
    pub async fn api<W: Write, E: Write>(
        &mut self,
        out: &mut W,
        err: &mut E,
        format: &OutputFormat,
        args: &ApiArgs,
    ) -> Result<(), CliError> {
        let session = match args.url.as_deref() {
            None => self.resolver.store().read()?,
            Some(url) => {
                let outcome = self
                    .resolver
                    .set_api(url, args.skip_ssl_validation)
                    .await;
                write_warnings(err, &outcome.warnings)?;
                let session = outcome.result?;
                format.status(out, "OK")?;
                session
            }
        };
        format.write(out, &TargetSummary::from(&session))
    }

    /// Runs `stratus target`: shows the targets, or changes them.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not logged in or a name is unknown.
    pub async fn target<W: Write, E: Write>(
        &mut self,
        out: &mut W,
        err: &mut E,
        format: &OutputFormat,
        args: &TargetArgs,
    ) -> Result<(), CliError> {
        let session = if args.org.is_none() && args.space.is_none() {
            let session = self.resolver.store().read()?;
            if !session.is_logged_in() {
                return Err(CliError::NotLoggedIn);
            }
            session
        } else {
            let outcome = self
                .resolver
                .target(args.org.as_deref(), args.space.as_deref())
                .await;
            write_warnings(err, &outcome.warnings)?;
            outcome.result?
        };
        format.write(out, &TargetSummary::from(&session))
    }
}

/// Maps `login` flags onto a request; prompting is always allowed.
fn login_request(args: &LoginArgs) -> LoginRequest {
    LoginRequest {
        endpoint: args.api.clone(),
        skip_ssl_validation: args.skip_ssl_validation,
        username: args.username.clone(),
        password: args.password.clone().map(Zeroizing::new),
        sso: args.sso,
        sso_passcode: args.sso_passcode.clone(),
        client_credentials: false,
        organization: args.org.clone(),
        space: args.space.clone(),
        interactive: true,
    }
}

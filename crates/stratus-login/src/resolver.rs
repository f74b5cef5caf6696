//! The credential resolver: the login state machine.
//!
//! A login walks `Unauthenticated → EndpointResolved → TlsDecision →
//! CredentialsCollected → Authenticated → TargetResolved`. Any step may end in
//! `Failed`. The session is written once, at the end, and only on success.

use std::fmt;
use std::future::Future;

use stratus_api::{
    ApiError, ApiTarget, ControlPlaneClient, Credentials, EndpointInfo, Filter, Organization,
    Space, TokenPair, Warned, Warnings,
};
use stratus_session::{Session, SessionStore, TargetRef};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::request::{LoginRequest, Selector};

/// Warning emitted for plain-http endpoints.
pub const INSECURE_ENDPOINT_WARNING: &str =
    "Insecure http API endpoint detected: secure https API endpoints are recommended";

/// Label of the endpoint prompt.
pub const ENDPOINT_PROMPT: &str = "API endpoint";

/// Login states, logged as the flow advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Nothing resolved yet.
    Unauthenticated,
    /// The endpoint to log in to is known.
    EndpointResolved,
    /// The endpoint answered and its certificate was accepted.
    TlsDecision,
    /// Credentials are ready to submit.
    CredentialsCollected,
    /// Tokens were issued.
    Authenticated,
    /// Organization and space are settled and the session is saved.
    TargetResolved,
    /// The flow stopped with an error.
    Failed,
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::EndpointResolved => "endpoint-resolved",
            Self::TlsDecision => "tls-decision",
            Self::CredentialsCollected => "credentials-collected",
            Self::Authenticated => "authenticated",
            Self::TargetResolved => "target-resolved",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn enter(state: LoginState) {
    debug!(state = %state, "login state");
}

/// Runs `future` unless `cancel` fires first.
async fn cancellable<F: Future>(cancel: &CancellationToken, future: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        output = future => Ok(output),
    }
}

/// Drives login, logout, endpoint and target changes.
///
/// The resolver is the only writer of the session. Every prompt and request
/// races the cancellation token; a cancelled flow writes nothing.
pub struct CredentialResolver<C, S, P> {
    client: C,
    store: S,
    prompter: P,
    cancel: CancellationToken,
}

impl<C, S, P> fmt::Debug for CredentialResolver<C, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<C, S, P> CredentialResolver<C, S, P>
where
    C: ControlPlaneClient,
    S: SessionStore,
    P: Prompter,
{
    /// Creates a resolver.
    pub const fn new(client: C, store: S, prompter: P, cancel: CancellationToken) -> Self {
        Self {
            client,
            store,
            prompter,
            cancel,
        }
    }

    /// The control-plane client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The session store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Logs in and saves the resulting session.
    ///
    /// Rejected credentials end in [`Error::Authentication`]; retrying is up to
    /// the caller.
    pub async fn login(&mut self, request: &LoginRequest) -> Warned<Session, Error> {
        let mut warnings = Warnings::new();
        enter(LoginState::Unauthenticated);
        let result = self.run_login(request, &mut warnings).await;
        match &result {
            Ok(session) => info!(
                endpoint = session.api_endpoint.as_deref().unwrap_or_default(),
                method = ?session.auth_method,
                "logged in"
            ),
            Err(e) => {
                enter(LoginState::Failed);
                debug!(error = %e, "login failed");
            }
        }
        Warned::new(result, warnings)
    }

    async fn run_login(
        &mut self,
        request: &LoginRequest,
        warnings: &mut Warnings,
    ) -> Result<Session> {
        let selector = request.selector()?;
        let current = self.store.read()?;

        if current.is_service_account() && selector.method().is_human() {
            return Err(Error::SessionConflict);
        }

        let target = self.resolve_endpoint(request, &current).await?;
        enter(LoginState::EndpointResolved);

        let info = self.connect(&target, warnings).await?;
        enter(LoginState::TlsDecision);

        let method = selector.method();
        let credentials = self.collect_credentials(selector, &info, request.interactive).await?;
        enter(LoginState::CredentialsCollected);

        let tokens = match cancellable(&self.cancel, self.client.authenticate(&credentials)).await? {
            Ok(tokens) => tokens,
            Err(ApiError::InvalidCredentials) => {
                return Err(Error::Authentication {
                    endpoint: target.endpoint.clone(),
                });
            }
            Err(ApiError::Tls { host, reason }) => {
                debug!(%host, %reason, "authorization server certificate rejected");
                return Err(Error::TlsValidation { host });
            }
            Err(e) => return Err(e.into()),
        };
        enter(LoginState::Authenticated);

        let prompt_for_target = request.interactive && method.is_human();
        let organization = self
            .resolve_organization(request.organization.as_deref(), prompt_for_target, warnings)
            .await?;
        let space = match &organization {
            Some(org) => {
                self.resolve_space(org, request.space.as_deref(), prompt_for_target, warnings)
                    .await?
            }
            None if request.space.is_some() => {
                return Err(Error::usage("a space can only be targeted inside an organization"));
            }
            None => None,
        };

        let session = Session {
            api_endpoint: Some(target.endpoint),
            skip_ssl_validation: target.skip_ssl_validation,
            api_version: Some(info.api_version).filter(|v| !v.is_empty()),
            authorization_endpoint: Some(info.authorization_endpoint),
            access_token: Some(tokens.access_token),
            refresh_token: tokens.refresh_token,
            auth_method: Some(method),
            organization: organization.as_ref().map(TargetRef::from),
            space: space.as_ref().map(TargetRef::from),
        };
        self.store.write_atomic(&session)?;
        enter(LoginState::TargetResolved);
        Ok(session)
    }

    /// Explicit endpoint, else the saved one, else a prompt.
    async fn resolve_endpoint(&self, request: &LoginRequest, current: &Session) -> Result<ApiTarget> {
        if let Some(endpoint) = request.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
            return Ok(ApiTarget::new(endpoint, request.skip_ssl_validation));
        }
        if let Some(saved) = current.target() {
            debug!(endpoint = %saved.endpoint, "using saved API endpoint");
            return Ok(ApiTarget {
                skip_ssl_validation: request.skip_ssl_validation || saved.skip_ssl_validation,
                ..saved
            });
        }
        if !request.interactive {
            return Err(Error::usage(
                "no API endpoint set. Use 'stratus login' or 'stratus api' to target an endpoint",
            ));
        }
        let endpoint = self.ask_required(ENDPOINT_PROMPT, false).await?;
        Ok(ApiTarget::new(&endpoint, request.skip_ssl_validation))
    }

    /// Queries the endpoint, turning certificate failures into
    /// [`Error::TlsValidation`].
    async fn connect(&mut self, target: &ApiTarget, warnings: &mut Warnings) -> Result<EndpointInfo> {
        if target.is_insecure() {
            warn!(endpoint = %target.endpoint, "insecure API endpoint");
            warnings.push(INSECURE_ENDPOINT_WARNING);
        }
        match cancellable(&self.cancel, self.client.connect(target)).await? {
            Ok(info) => Ok(info),
            Err(ApiError::Tls { host, reason }) => {
                debug!(%host, %reason, "certificate rejected");
                Err(Error::TlsValidation { host })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn collect_credentials(
        &self,
        selector: Selector,
        info: &EndpointInfo,
        interactive: bool,
    ) -> Result<Credentials> {
        let needs_prompt = |what: &str| {
            Error::usage(format!("{what} is required when not running interactively"))
        };
        match selector {
            Selector::Password { username, password } => {
                let username = match username {
                    Some(username) => username,
                    None if interactive => self.ask_required("Email", false).await?,
                    None => return Err(needs_prompt("a username")),
                };
                let password = match password {
                    Some(password) => password,
                    None if interactive => Zeroizing::new(self.ask_required("Password", true).await?),
                    None => return Err(needs_prompt("a password")),
                };
                Ok(Credentials::password(username, password.as_str()))
            }
            Selector::Sso => {
                if !interactive {
                    return Err(needs_prompt("a passcode"));
                }
                self.prompter.say(&format!(
                    "Temporary Authentication Code ( Get one at {} )",
                    info.passcode_url()
                ));
                let passcode = Zeroizing::new(
                    self.ask_required("Temporary Authentication Code", true)
                        .await?,
                );
                Ok(Credentials::sso_passcode(passcode.as_str()))
            }
            Selector::SsoPasscode(passcode) => Ok(Credentials::sso_passcode(passcode.as_str())),
            Selector::ClientCredentials {
                client_id,
                client_secret,
            } => Ok(Credentials::client(client_id, client_secret.as_str())),
        }
    }

    async fn resolve_organization(
        &self,
        name: Option<&str>,
        prompt: bool,
        warnings: &mut Warnings,
    ) -> Result<Option<Organization>> {
        if let Some(name) = name {
            let filter = Filter::name(name);
            let found = warnings.absorb(
                cancellable(&self.cancel, self.client.organizations(&[filter])).await?,
            )?;
            return found
                .into_iter()
                .next()
                .map(Some)
                .ok_or_else(|| Error::OrganizationNotFound {
                    name: name.to_string(),
                });
        }

        let organizations =
            warnings.absorb(cancellable(&self.cancel, self.client.organizations(&[])).await?)?;
        self.choose("Org", organizations, prompt, |o| o.name.as_str())
            .await
    }

    async fn resolve_space(
        &self,
        organization: &Organization,
        name: Option<&str>,
        prompt: bool,
        warnings: &mut Warnings,
    ) -> Result<Option<Space>> {
        let mut filters = vec![Filter::organization_guid(&organization.guid)];
        if let Some(name) = name {
            filters.push(Filter::name(name));
            let found =
                warnings.absorb(cancellable(&self.cancel, self.client.spaces(&filters)).await?)?;
            return found
                .into_iter()
                .next()
                .map(Some)
                .ok_or_else(|| Error::SpaceNotFound {
                    name: name.to_string(),
                });
        }

        let spaces =
            warnings.absorb(cancellable(&self.cancel, self.client.spaces(&filters)).await?)?;
        self.choose("Space", spaces, prompt, |s| s.name.as_str())
            .await
    }

    /// Picks one of `items`: the only one, none, or the operator's choice.
    async fn choose<T>(
        &self,
        kind: &str,
        items: Vec<T>,
        prompt: bool,
        name_of: impl Fn(&T) -> &str,
    ) -> Result<Option<T>> {
        if items.len() <= 1 {
            return Ok(items.into_iter().next());
        }
        if !prompt {
            debug!(kind, count = items.len(), "several candidates, leaving untargeted");
            return Ok(None);
        }

        self.prompter.say(&format!("Select an {}:", kind.to_lowercase()));
        for (index, item) in items.iter().enumerate() {
            self.prompter.say(&format!("{}. {}", index + 1, name_of(item)));
        }
        let label = format!("{kind} (enter to skip)");
        loop {
            let answer = cancellable(&self.cancel, self.prompter.ask(&label)).await??;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(None);
            }
            let picked = answer
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=items.len()).contains(n))
                .map(|n| n - 1)
                .or_else(|| items.iter().position(|item| name_of(item) == answer));
            if let Some(index) = picked {
                return Ok(items.into_iter().nth(index));
            }
            self.prompter.say(&format!("{kind} '{answer}' is not one of the choices."));
        }
    }

    /// Asks until a non-blank answer arrives.
    async fn ask_required(&self, label: &str, secret: bool) -> Result<String> {
        loop {
            let answer = if secret {
                cancellable(&self.cancel, self.prompter.ask_secret(label)).await??
            } else {
                cancellable(&self.cancel, self.prompter.ask(label)).await??
            };
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
    }

    /// Points the session at a new endpoint.
    ///
    /// Switching to a different endpoint logs out; setting the same endpoint
    /// again keeps the login and targets.
    pub async fn set_api(&mut self, endpoint: &str, skip_ssl_validation: bool) -> Warned<Session, Error> {
        let mut warnings = Warnings::new();
        let result: Result<Session> = async {
            if endpoint.trim().is_empty() {
                return Err(Error::usage("an API endpoint is required"));
            }
            let current = self.store.read()?;
            let target = ApiTarget::new(endpoint, skip_ssl_validation);
            let info = self.connect(&target, &mut warnings).await?;

            let mut session = if current.api_endpoint.as_deref() == Some(target.endpoint.as_str()) {
                current
            } else {
                Session::default()
            };
            session.api_endpoint = Some(target.endpoint);
            session.skip_ssl_validation = target.skip_ssl_validation;
            session.api_version = Some(info.api_version).filter(|v| !v.is_empty());
            session.authorization_endpoint = Some(info.authorization_endpoint);
            self.store.write_atomic(&session)?;
            Ok(session)
        }
        .await;
        Warned::new(result, warnings)
    }

    /// Changes the targeted organization and space of the saved login.
    ///
    /// A new organization without a space clears the space, unless the
    /// organization has exactly one.
    pub async fn target(
        &mut self,
        organization: Option<&str>,
        space: Option<&str>,
    ) -> Warned<Session, Error> {
        let mut warnings = Warnings::new();
        let result: Result<Session> = async {
            let mut session = self.store.read()?;
            let (Some(target), Some(tokens)) = (session.target(), session.tokens()) else {
                return Err(Error::usage("not logged in. Use 'stratus login' to log in"));
            };
            self.reconnect(&target, tokens, &mut warnings).await?;

            if let Some(name) = organization {
                let org = self
                    .resolve_organization(Some(name), false, &mut warnings)
                    .await?
                    .ok_or_else(|| Error::OrganizationNotFound {
                        name: name.to_string(),
                    })?;
                let chosen_space = self
                    .resolve_space(&org, space, false, &mut warnings)
                    .await?;
                session.organization = Some(TargetRef::from(&org));
                session.space = chosen_space.as_ref().map(TargetRef::from);
            } else if let Some(name) = space {
                let Some(current_org) = session.organization.clone() else {
                    return Err(Error::usage(
                        "no organization targeted. Use 'stratus target -o ORG' first",
                    ));
                };
                let org = Organization {
                    guid: current_org.guid,
                    name: current_org.name,
                };
                let chosen = self
                    .resolve_space(&org, Some(name), false, &mut warnings)
                    .await?;
                session.space = chosen.as_ref().map(TargetRef::from);
            }

            self.store.write_atomic(&session)?;
            Ok(session)
        }
        .await;
        Warned::new(result, warnings)
    }

    async fn reconnect(
        &mut self,
        target: &ApiTarget,
        tokens: TokenPair,
        warnings: &mut Warnings,
    ) -> Result<()> {
        self.connect(target, warnings).await?;
        self.client.set_tokens(tokens);
        Ok(())
    }

    /// Forgets tokens, auth method and targets, keeping the endpoint.
    pub fn logout(&self) -> Result<Session> {
        let session = self.store.read()?.logged_out();
        self.store.write_atomic(&session)?;
        info!("logged out");
        Ok(session)
    }
}

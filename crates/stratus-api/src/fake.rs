//! Deterministic in-memory [`ControlPlaneClient`] for tests.
//!
//! Every call is recorded in a shared [`CallLog`] and answered with the value
//! configured through the `with_*` builders, so tests can assert both what was
//! sent and how the caller handled the reply.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::{ApiWarned, ControlPlaneClient};
use crate::credentials::{AuthMethod, Credentials, TokenPair};
use crate::error::{ApiError, Result};
use crate::filter::Filter;
use crate::types::{
    ApiTarget, Buildpack, BuildpackRequest, EndpointInfo, Organization, ServiceBroker, Space,
};
use crate::warnings::{Warned, Warnings};

/// A call received by the fake client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `connect`
    Connect(ApiTarget),
    /// `authenticate`, with the method of the submitted credentials.
    Authenticate(AuthMethod),
    /// `organizations`
    Organizations(Vec<Filter>),
    /// `spaces`
    Spaces(Vec<Filter>),
    /// `create_service_broker`
    CreateServiceBroker {
        /// Broker name.
        name: String,
        /// Broker username.
        username: String,
        /// Broker password.
        password: String,
        /// Broker URL.
        url: String,
        /// Space scope.
        space_guid: Option<String>,
    },
    /// `service_brokers`
    ServiceBrokers(Vec<Filter>),
    /// `create_buildpack`
    CreateBuildpack(BuildpackRequest),
    /// `buildpacks`
    Buildpacks(Vec<Filter>),
}

/// Shared record of the calls a fake received, in order.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn record(&self, call: Call) {
        self.0.lock().push(call);
    }

    /// All calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if no call was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Number of calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().iter().filter(|c| predicate(c)).count()
    }
}

type Canned<T> = (Result<T>, Warnings);

/// Fake control-plane client.
#[derive(Debug)]
pub struct FakeControlPlaneClient {
    log: CallLog,
    connect: Result<EndpointInfo>,
    authenticate: Result<TokenPair>,
    tokens: Option<TokenPair>,
    organizations: Canned<Vec<Organization>>,
    spaces: Canned<Vec<Space>>,
    create_service_broker: Canned<ServiceBroker>,
    service_brokers: Canned<Vec<ServiceBroker>>,
    create_buildpack: Canned<Buildpack>,
    buildpacks: Canned<Vec<Buildpack>>,
}

impl Default for FakeControlPlaneClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeControlPlaneClient {
    /// A fake that connects and authenticates successfully and lists nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            connect: Ok(EndpointInfo {
                api_version: "2.150.0".into(),
                authorization_endpoint: "https://login.example.com".into(),
            }),
            authenticate: Ok(TokenPair {
                access_token: "access-token".into(),
                refresh_token: Some("refresh-token".into()),
                token_type: "bearer".into(),
            }),
            tokens: None,
            organizations: (Ok(Vec::new()), Warnings::new()),
            spaces: (Ok(Vec::new()), Warnings::new()),
            create_service_broker: (Ok(ServiceBroker::default()), Warnings::new()),
            service_brokers: (Ok(Vec::new()), Warnings::new()),
            create_buildpack: (Ok(Buildpack::default()), Warnings::new()),
            buildpacks: (Ok(Vec::new()), Warnings::new()),
        }
    }

    /// Handle to the call log, usable after the fake has been moved.
    #[must_use]
    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }

    /// Tokens installed through `authenticate` or `set_tokens`.
    #[must_use]
    pub const fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    /// Sets the reply to `connect`.
    #[must_use]
    pub fn with_connect(mut self, reply: Result<EndpointInfo>) -> Self {
        self.connect = reply;
        self
    }

    /// Sets the reply to `authenticate`.
    #[must_use]
    pub fn with_authenticate(mut self, reply: Result<TokenPair>) -> Self {
        self.authenticate = reply;
        self
    }

    /// Sets the reply to `organizations`.
    #[must_use]
    pub fn with_organizations(
        mut self,
        reply: Result<Vec<Organization>>,
        warnings: impl Into<Warnings>,
    ) -> Self {
        self.organizations = (reply, warnings.into());
        self
    }

    /// Sets the reply to `spaces`.
    #[must_use]
    pub fn with_spaces(mut self, reply: Result<Vec<Space>>, warnings: impl Into<Warnings>) -> Self {
        self.spaces = (reply, warnings.into());
        self
    }

    /// Sets the reply to `create_service_broker`.
    #[must_use]
    pub fn with_create_service_broker(
        mut self,
        reply: Result<ServiceBroker>,
        warnings: impl Into<Warnings>,
    ) -> Self {
        self.create_service_broker = (reply, warnings.into());
        self
    }

    /// Sets the reply to `service_brokers`.
    #[must_use]
    pub fn with_service_brokers(
        mut self,
        reply: Result<Vec<ServiceBroker>>,
        warnings: impl Into<Warnings>,
    ) -> Self {
        self.service_brokers = (reply, warnings.into());
        self
    }

    /// Sets the reply to `create_buildpack`.
    #[must_use]
    pub fn with_create_buildpack(
        mut self,
        reply: Result<Buildpack>,
        warnings: impl Into<Warnings>,
    ) -> Self {
        self.create_buildpack = (reply, warnings.into());
        self
    }

    /// Sets the reply to `buildpacks`.
    #[must_use]
    pub fn with_buildpacks(
        mut self,
        reply: Result<Vec<Buildpack>>,
        warnings: impl Into<Warnings>,
    ) -> Self {
        self.buildpacks = (reply, warnings.into());
        self
    }
}

fn replay<T: Clone>(canned: &Canned<T>) -> Warned<T, ApiError> {
    Warned::new(canned.0.clone(), canned.1.clone())
}

impl ControlPlaneClient for FakeControlPlaneClient {
    async fn connect(&mut self, target: &ApiTarget) -> Result<EndpointInfo> {
        self.log.record(Call::Connect(target.clone()));
        self.connect.clone()
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<TokenPair> {
        self.log.record(Call::Authenticate(credentials.method()));
        let reply = self.authenticate.clone();
        if let Ok(tokens) = &reply {
            self.tokens = Some(tokens.clone());
        }
        reply
    }

    fn set_tokens(&mut self, tokens: TokenPair) {
        self.tokens = Some(tokens);
    }

    async fn organizations(&self, filters: &[Filter]) -> ApiWarned<Vec<Organization>> {
        self.log.record(Call::Organizations(filters.to_vec()));
        replay(&self.organizations)
    }

    async fn spaces(&self, filters: &[Filter]) -> ApiWarned<Vec<Space>> {
        self.log.record(Call::Spaces(filters.to_vec()));
        replay(&self.spaces)
    }

    async fn create_service_broker(
        &self,
        name: &str,
        username: &str,
        password: &str,
        url: &str,
        space_guid: Option<&str>,
    ) -> ApiWarned<ServiceBroker> {
        self.log.record(Call::CreateServiceBroker {
            name: name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            url: url.to_string(),
            space_guid: space_guid.map(str::to_string),
        });
        replay(&self.create_service_broker)
    }

    async fn service_brokers(&self, filters: &[Filter]) -> ApiWarned<Vec<ServiceBroker>> {
        self.log.record(Call::ServiceBrokers(filters.to_vec()));
        replay(&self.service_brokers)
    }

    async fn create_buildpack(&self, request: &BuildpackRequest) -> ApiWarned<Buildpack> {
        self.log.record(Call::CreateBuildpack(request.clone()));
        replay(&self.create_buildpack)
    }

    async fn buildpacks(&self, filters: &[Filter]) -> ApiWarned<Vec<Buildpack>> {
        self.log.record(Call::Buildpacks(filters.to_vec()));
        replay(&self.buildpacks)
    }
}

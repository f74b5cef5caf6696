//! The control-plane client contract.
//!
//! The actor and login layers depend only on [`ControlPlaneClient`]; the HTTP
//! transport in [`crate::http`] is one implementation and tests inject fakes.

use std::future::Future;

use crate::credentials::{Credentials, TokenPair};
use crate::error::{ApiError, Result};
use crate::filter::Filter;
use crate::types::{
    ApiTarget, Buildpack, BuildpackRequest, EndpointInfo, Organization, ServiceBroker, Space,
};
use crate::warnings::Warned;

/// Outcome of a list or create call: the value or error plus warnings.
pub type ApiWarned<T> = Warned<T, ApiError>;

/// Operations the core needs from the remote control plane.
///
/// List and create calls return their warnings even on failure. Connection and
/// authentication calls carry no warnings.
pub trait ControlPlaneClient: Send + Sync {
    /// Points the client at `target` and fetches its endpoint metadata.
    ///
    /// This is the first network contact with an endpoint, so certificate
    /// trust failures surface here as [`ApiError::Tls`].
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unreachable, untrusted or answers
    /// with something other than endpoint metadata.
    fn connect(&mut self, target: &ApiTarget) -> impl Future<Output = Result<EndpointInfo>> + Send;

    /// Exchanges credentials for a token pair and starts using it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCredentials`] if the credentials are rejected.
    fn authenticate(
        &mut self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<TokenPair>> + Send;

    /// Uses an already issued token pair for subsequent calls.
    fn set_tokens(&mut self, tokens: TokenPair);

    /// Lists organizations matching `filters`.
    fn organizations(
        &self,
        filters: &[Filter],
    ) -> impl Future<Output = ApiWarned<Vec<Organization>>> + Send;

    /// Lists spaces matching `filters`.
    fn spaces(&self, filters: &[Filter]) -> impl Future<Output = ApiWarned<Vec<Space>>> + Send;

    /// Registers a service broker.
    fn create_service_broker(
        &self,
        name: &str,
        username: &str,
        password: &str,
        url: &str,
        space_guid: Option<&str>,
    ) -> impl Future<Output = ApiWarned<ServiceBroker>> + Send;

    /// Lists service brokers matching `filters`.
    fn service_brokers(
        &self,
        filters: &[Filter],
    ) -> impl Future<Output = ApiWarned<Vec<ServiceBroker>>> + Send;

    /// Creates a buildpack record.
    fn create_buildpack(
        &self,
        request: &BuildpackRequest,
    ) -> impl Future<Output = ApiWarned<Buildpack>> + Send;

    /// Lists buildpacks matching `filters`.
    fn buildpacks(&self, filters: &[Filter])
    -> impl Future<Output = ApiWarned<Vec<Buildpack>>> + Send;
}

//! HTTP transport for the control-plane API.
//!
//! Speaks the v2 JSON API (`/v2/...` resources wrapped in
//! `{metadata, entity}` envelopes, paginated through `next_url`) and an
//! OAuth token endpoint on the authorization server. Warnings arrive in the
//! [`WARNINGS_HEADER`] response header.

use std::time::Duration;

use percent_encoding::percent_decode_str;
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::client::{ApiWarned, ControlPlaneClient};
use crate::credentials::{Credentials, TokenPair};
use crate::error::{ApiError, Result};
use crate::filter::{Filter, query_pairs};
use crate::trace::{Direction, TraceConfig, Tracer};
use crate::types::{
    ApiTarget, Buildpack, BuildpackRequest, EndpointInfo, Organization, ServiceBroker, Space,
};
use crate::warnings::{Warned, Warnings};

/// Response header carrying comma-separated, percent-encoded warnings.
pub const WARNINGS_HEADER: &str = "X-Cf-Warnings";

/// Default request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth client used for human logins.
const DEFAULT_OAUTH_CLIENT_ID: &str = "cf";

/// Upper bound on followed `next_url` links for one listing.
const MAX_PAGES: usize = 200;

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Request trace sink.
    pub trace: TraceConfig,
    /// OAuth client identifier used for password and passcode grants.
    pub oauth_client_id: String,
    /// OAuth client secret used for password and passcode grants.
    pub oauth_client_secret: String,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            trace: TraceConfig::Off,
            oauth_client_id: DEFAULT_OAUTH_CLIENT_ID.to_string(),
            oauth_client_secret: String::new(),
            user_agent: format!("stratus/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Control-plane client over HTTP.
pub struct HttpClient {
    config: HttpClientConfig,
    tracer: Tracer,
    http: Client,
    target: Option<ApiTarget>,
    info: Option<EndpointInfo>,
    tokens: Option<TokenPair>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("target", &self.target)
            .field("info", &self.info)
            .field("authenticated", &self.tokens.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a client with no endpoint selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let http = build_http(&config, false)?;
        let tracer = Tracer::new(config.trace.clone());
        Ok(Self {
            config,
            tracer,
            http,
            target: None,
            info: None,
            tokens: None,
        })
    }

    /// Creates a client for an endpoint stored in a previous session.
    ///
    /// No request is made; the endpoint is trusted to be the one recorded at
    /// login.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn for_target(
        config: HttpClientConfig,
        target: ApiTarget,
        info: Option<EndpointInfo>,
        tokens: Option<TokenPair>,
    ) -> Result<Self> {
        let http = build_http(&config, target.skip_ssl_validation)?;
        let tracer = Tracer::new(config.trace.clone());
        Ok(Self {
            config,
            tracer,
            http,
            target: Some(target),
            info,
            tokens,
        })
    }

    /// The currently selected endpoint.
    #[must_use]
    pub const fn target(&self) -> Option<&ApiTarget> {
        self.target.as_ref()
    }

    fn api_url(&self, path: &str) -> Result<String> {
        let target = self.target.as_ref().ok_or(ApiError::NotConnected)?;
        Ok(format!("{}{}", target.endpoint, path))
    }

    fn api_host(&self) -> String {
        self.target.as_ref().map(ApiTarget::host).unwrap_or_default()
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let tokens = self.tokens.as_ref().ok_or_else(|| ApiError::Unauthorized {
            description: "not logged in".to_string(),
        })?;
        Ok(builder
            .header(ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, tokens.authorization()))
    }

    /// Sends one request, tracing both directions.
    async fn send(&self, builder: RequestBuilder, host: &str) -> Result<RawResponse> {
        let (client, request) = builder.build_split();
        let request = request.map_err(|e| ApiError::InvalidArgument(e.to_string()))?;

        if self.tracer.is_enabled() {
            let body = request
                .body()
                .and_then(reqwest::Body::as_bytes)
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default();
            let head = format!(
                "{} {} HTTP/1.1\n{}",
                request.method(),
                request.url(),
                format_headers(request.headers())
            );
            self.tracer.record(Direction::Request, &head, &body);
        }

        trace!(method = %request.method(), url = %request.url(), "sending request");
        let response = client
            .execute(request)
            .await
            .map_err(|e| classify_send_error(&e, host))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if self.tracer.is_enabled() {
            let head = format!("HTTP/1.1 {status}\n{}", format_headers(&headers));
            self.tracer.record(Direction::Response, &head, &body);
        }
        trace!(status = status.as_u16(), "received response");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Fetches every page of a v2 listing, gathering warnings page by page.
    async fn list<E, T>(
        &self,
        path: &str,
        filters: &[Filter],
        map: fn(Resource<E>) -> T,
    ) -> ApiWarned<Vec<T>>
    where
        E: DeserializeOwned,
    {
        let mut warnings = Warnings::new();
        let result: Result<Vec<T>> = async {
            let host = self.api_host();
            let mut url = self.api_url(path)?;
            let mut query = query_pairs(filters);
            let mut items = Vec::new();
            for _ in 0..MAX_PAGES {
                let request = self.authorized(self.http.get(&url).query(&query))?;
                let response = self.send(request, &host).await?;
                warnings.extend(parse_warnings(&response.headers));
                let page: Page<E> = decode(&response)?;
                items.extend(page.resources.into_iter().map(map));
                match page.next_url {
                    Some(next) => {
                        url = self.api_url(&next)?;
                        query.clear();
                    }
                    None => return Ok(items),
                }
            }
            Err(ApiError::Protocol(format!("{path} returned more than {MAX_PAGES} pages")))
        }
        .await;
        Warned::new(result, warnings)
    }

    /// Posts a creation request and decodes the single returned resource.
    async fn create<B, E, T>(&self, path: &str, body: &B, map: fn(Resource<E>) -> T) -> ApiWarned<T>
    where
        B: Serialize + Sync,
        E: DeserializeOwned,
    {
        let mut warnings = Warnings::new();
        let result: Result<T> = async {
            let host = self.api_host();
            let url = self.api_url(path)?;
            let request = self.authorized(self.http.post(&url).json(body))?;
            let response = self.send(request, &host).await?;
            warnings.extend(parse_warnings(&response.headers));
            let resource: Resource<E> = decode(&response)?;
            Ok(map(resource))
        }
        .await;
        Warned::new(result, warnings)
    }
}

impl ControlPlaneClient for HttpClient {
    async fn connect(&mut self, target: &ApiTarget) -> Result<EndpointInfo> {
        let http = build_http(&self.config, target.skip_ssl_validation)?;
        let url = format!("{}/v2/info", target.endpoint);
        let request = http.get(&url).header(ACCEPT, "application/json");
        let response = self.send(request, &target.host()).await?;
        let info: EndpointInfo = decode(&response)?;
        debug!(
            endpoint = %target.endpoint,
            api_version = %info.api_version,
            "connected to API endpoint"
        );

        self.http = http;
        self.target = Some(target.clone());
        self.info = Some(info.clone());
        self.tokens = None;
        Ok(info)
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<TokenPair> {
        let info = self.info.as_ref().ok_or(ApiError::NotConnected)?;
        let url = format!(
            "{}/oauth/token",
            info.authorization_endpoint.trim_end_matches('/')
        );
        let host = url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        let grant = token_grant(credentials, &self.config)?;
        let request = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .basic_auth(grant.client_id, Some(grant.client_secret))
            .form(&grant.form);
        let response = self.send(request, &host).await?;

        let tokens = match response.status {
            status if status.is_success() => serde_json::from_str::<TokenPair>(&response.body)
                .map_err(|e| ApiError::Protocol(format!("invalid token response: {e}")))?,
            StatusCode::UNAUTHORIZED => return Err(ApiError::InvalidCredentials),
            StatusCode::BAD_REQUEST if is_rejected_grant(&response.body) => {
                return Err(ApiError::InvalidCredentials);
            }
            status => return Err(remote_error(status, &response.body)),
        };
        debug!(method = %credentials.method(), "authenticated");
        self.tokens = Some(tokens.clone());
        Ok(tokens)
    }

    fn set_tokens(&mut self, tokens: TokenPair) {
        self.tokens = Some(tokens);
    }

    async fn organizations(&self, filters: &[Filter]) -> ApiWarned<Vec<Organization>> {
        self.list("/v2/organizations", filters, |r: Resource<NamedEntity>| Organization {
            guid: r.metadata.guid,
            name: r.entity.name,
        })
        .await
    }

    async fn spaces(&self, filters: &[Filter]) -> ApiWarned<Vec<Space>> {
        self.list("/v2/spaces", filters, |r: Resource<SpaceEntity>| Space {
            guid: r.metadata.guid,
            name: r.entity.name,
            organization_guid: r.entity.organization_guid,
        })
        .await
    }

    async fn create_service_broker(
        &self,
        name: &str,
        username: &str,
        password: &str,
        url: &str,
        space_guid: Option<&str>,
    ) -> ApiWarned<ServiceBroker> {
        let body = ServiceBrokerBody {
            name,
            broker_url: url,
            auth_username: username,
            auth_password: password,
            space_guid,
        };
        self.create("/v2/service_brokers", &body, service_broker_from).await
    }

    async fn service_brokers(&self, filters: &[Filter]) -> ApiWarned<Vec<ServiceBroker>> {
        self.list("/v2/service_brokers", filters, service_broker_from)
            .await
    }

    async fn create_buildpack(&self, request: &BuildpackRequest) -> ApiWarned<Buildpack> {
        self.create("/v2/buildpacks", request, buildpack_from).await
    }

    async fn buildpacks(&self, filters: &[Filter]) -> ApiWarned<Vec<Buildpack>> {
        self.list("/v2/buildpacks", filters, buildpack_from).await
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// A response read to completion.
#[derive(Debug)]
struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "E: DeserializeOwned"))]
struct Page<E> {
    #[serde(default)]
    next_url: Option<String>,
    #[serde(default)]
    resources: Vec<Resource<E>>,
}

#[derive(Debug, Deserialize)]
struct Resource<E> {
    metadata: Metadata,
    entity: E,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    guid: String,
}

#[derive(Debug, Deserialize)]
struct NamedEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpaceEntity {
    name: String,
    #[serde(default)]
    organization_guid: String,
}

#[derive(Debug, Deserialize)]
struct ServiceBrokerEntity {
    name: String,
    #[serde(default)]
    broker_url: String,
    #[serde(default)]
    auth_username: String,
    #[serde(default)]
    space_guid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BuildpackEntity {
    name: String,
    #[serde(default)]
    position: u32,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    stack: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Debug, Serialize)]
struct ServiceBrokerBody<'a> {
    name: &'a str,
    broker_url: &'a str,
    auth_username: &'a str,
    auth_password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    space_guid: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    #[serde(default)]
    error: String,
}

fn service_broker_from(r: Resource<ServiceBrokerEntity>) -> ServiceBroker {
    ServiceBroker {
        guid: r.metadata.guid,
        name: r.entity.name,
        broker_url: r.entity.broker_url,
        auth_username: r.entity.auth_username,
        space_guid: r.entity.space_guid,
    }
}

fn buildpack_from(r: Resource<BuildpackEntity>) -> Buildpack {
    Buildpack {
        guid: r.metadata.guid,
        name: r.entity.name,
        position: r.entity.position,
        enabled: r.entity.enabled,
        locked: r.entity.locked,
        stack: r.entity.stack,
        filename: r.entity.filename,
    }
}

/// Form and client identity for one token request.
struct TokenGrant<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    form: Vec<(&'static str, &'a str)>,
}

fn token_grant<'a>(
    credentials: &'a Credentials,
    config: &'a HttpClientConfig,
) -> Result<TokenGrant<'a>> {
    let grant = match credentials {
        Credentials::Password { username, password } => TokenGrant {
            client_id: &config.oauth_client_id,
            client_secret: &config.oauth_client_secret,
            form: vec![
                ("grant_type", "password"),
                ("username", username.as_str()),
                ("password", password.as_str()),
            ],
        },
        Credentials::SsoPasscode { passcode } => TokenGrant {
            client_id: &config.oauth_client_id,
            client_secret: &config.oauth_client_secret,
            form: vec![("grant_type", "password"), ("passcode", passcode.as_str())],
        },
        Credentials::ClientCredentials {
            client_id,
            client_secret,
        } => TokenGrant {
            client_id: client_id.as_str(),
            client_secret: client_secret.as_str(),
            form: vec![("grant_type", "client_credentials")],
        },
        Credentials::Sso => {
            return Err(ApiError::InvalidArgument(
                "single sign-on must be completed with a passcode".to_string(),
            ));
        }
    };
    Ok(grant)
}

// ============================================================================
// Helpers
// ============================================================================

fn build_http(config: &HttpClientConfig, skip_ssl_validation: bool) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(skip_ssl_validation)
        .build()
        .map_err(|e| ApiError::Transport(e.to_string()))
}

/// Decodes a success body, or maps an error status to an [`ApiError`].
fn decode<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    if response.status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized {
            description: error_description(&response.body),
        });
    }
    if !response.status.is_success() {
        return Err(remote_error(response.status, &response.body));
    }
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Protocol(format!("invalid response body: {e}")))
}

fn remote_error(status: StatusCode, body: &str) -> ApiError {
    let parsed = serde_json::from_str::<RemoteErrorBody>(body).ok();
    let code = parsed.as_ref().and_then(|p| p.code);
    ApiError::Remote {
        status: status.as_u16(),
        code,
        description: error_description(body),
    }
}

fn error_description(body: &str) -> String {
    serde_json::from_str::<RemoteErrorBody>(body)
        .ok()
        .and_then(|p| p.description.or(p.error_description))
        .unwrap_or_else(|| body.trim().to_string())
}

fn is_rejected_grant(body: &str) -> bool {
    serde_json::from_str::<OAuthErrorBody>(body)
        .map(|e| e.error == "invalid_grant" || e.error == "unauthorized")
        .unwrap_or(false)
}

/// Splits the warnings header into decoded messages, in header order.
#[must_use]
pub fn parse_warnings(headers: &HeaderMap) -> Warnings {
    let mut warnings = Warnings::new();
    for value in headers.get_all(WARNINGS_HEADER) {
        let Ok(raw) = value.to_str() else {
            continue;
        };
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let spaced = part.replace('+', " ");
            warnings.push(percent_decode_str(&spaced).decode_utf8_lossy().into_owned());
        }
    }
    warnings
}

fn format_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{name}: {}", value.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps a failed send into a trust, timeout or transport error.
fn classify_send_error(err: &reqwest::Error, host: &str) -> ApiError {
    if let Some(reason) = certificate_failure(err) {
        return ApiError::Tls {
            host: host.to_string(),
            reason,
        };
    }
    if err.is_timeout() {
        return ApiError::Transport(format!("request to {host} timed out"));
    }
    let chain = error_chain(err);
    if chain.to_ascii_lowercase().contains("certificate") {
        return ApiError::Tls {
            host: host.to_string(),
            reason: chain,
        };
    }
    ApiError::Transport(chain)
}

/// Walks the source chain looking for a rustls certificate rejection.
fn certificate_failure(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(rustls::Error::InvalidCertificate(reason)) = e.downcast_ref::<rustls::Error>() {
            return Some(match reason {
                rustls::CertificateError::UnknownIssuer => "unknown authority".to_string(),
                other => format!("{other:?}"),
            });
        }
        if let Some(inner) = e
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::get_ref)
        {
            if let Some(found) = certificate_failure(inner) {
                return Some(found);
            }
        }
        current = e.source();
    }
    None
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        parts.push(e.to_string());
        current = e.source();
    }
    parts.join(": ")
}

//! Resource and endpoint types exchanged with the control plane.

use serde::{Deserialize, Serialize};

/// The endpoint a client talks to and how strictly it verifies TLS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTarget {
    /// Base URL of the control-plane API, without a trailing slash.
    pub endpoint: String,
    /// Skip certificate verification.
    pub skip_ssl_validation: bool,
}

impl ApiTarget {
    /// Builds a target, normalizing the endpoint.
    ///
    /// Scheme-less endpoints default to `https://`.
    #[must_use]
    pub fn new(endpoint: &str, skip_ssl_validation: bool) -> Self {
        Self {
            endpoint: normalize_endpoint(endpoint),
            skip_ssl_validation,
        }
    }

    /// Returns true if the endpoint uses plain, unencrypted HTTP.
    #[must_use]
    pub fn is_insecure(&self) -> bool {
        self.endpoint.starts_with("http://")
    }

    /// Host part of the endpoint, used in trust error messages.
    #[must_use]
    pub fn host(&self) -> String {
        url::Url::parse(&self.endpoint)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.endpoint.clone())
    }
}

/// Adds a default scheme and strips trailing slashes.
#[must_use]
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Metadata advertised by the API root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    /// API version string.
    #[serde(default)]
    pub api_version: String,
    /// Base URL of the authorization server.
    pub authorization_endpoint: String,
}

impl EndpointInfo {
    /// Page where single sign-on users obtain a one-time passcode.
    #[must_use]
    pub fn passcode_url(&self) -> String {
        format!("{}/passcode", self.authorization_endpoint.trim_end_matches('/'))
    }
}

/// An organization visible to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier.
    pub guid: String,
    /// Display name.
    pub name: String,
}

/// A space inside an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Unique identifier.
    pub guid: String,
    /// Display name.
    pub name: String,
    /// Owning organization.
    #[serde(default)]
    pub organization_guid: String,
}

/// A registered service broker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBroker {
    /// Unique identifier.
    pub guid: String,
    /// Display name, not necessarily unique.
    pub name: String,
    /// Broker URL.
    #[serde(default)]
    pub broker_url: String,
    /// Username the platform uses to call the broker.
    #[serde(default)]
    pub auth_username: String,
    /// Space the broker is scoped to, if any.
    #[serde(default)]
    pub space_guid: Option<String>,
}

/// A buildpack record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildpack {
    /// Unique identifier.
    pub guid: String,
    /// Display name.
    pub name: String,
    /// Detection order position, starting at 1.
    #[serde(default)]
    pub position: u32,
    /// Whether the buildpack is used for detection.
    #[serde(default)]
    pub enabled: bool,
    /// Whether the buildpack bits are locked against updates.
    #[serde(default)]
    pub locked: bool,
    /// Stack the buildpack targets.
    #[serde(default)]
    pub stack: Option<String>,
    /// Name of the uploaded bits, if any.
    #[serde(default)]
    pub filename: Option<String>,
}

/// Parameters for creating a buildpack record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildpackRequest {
    /// Buildpack name.
    pub name: String,
    /// Requested position; the platform appends when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Whether the buildpack starts enabled.
    pub enabled: bool,
    /// Whether the buildpack starts locked.
    pub locked: bool,
    /// Target stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl BuildpackRequest {
    /// An enabled, unlocked buildpack appended at the end of the order.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
            enabled: true,
            locked: false,
            stack: None,
        }
    }
}

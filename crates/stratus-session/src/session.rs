//! The persisted login session.

use std::fmt;

use serde::{Deserialize, Serialize};
use stratus_api::{ApiTarget, AuthMethod, EndpointInfo, Organization, Space, TokenPair};

/// A targeted organization or space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    /// Resource GUID.
    pub guid: String,
    /// Display name at the time it was targeted.
    pub name: String,
}

impl From<&Organization> for TargetRef {
    fn from(org: &Organization) -> Self {
        Self {
            guid: org.guid.clone(),
            name: org.name.clone(),
        }
    }
}

impl From<&Space> for TargetRef {
    fn from(space: &Space) -> Self {
        Self {
            guid: space.guid.clone(),
            name: space.name.clone(),
        }
    }
}

/// Everything remembered between invocations.
///
/// A default session has no endpoint and is logged out.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Normalized API endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    /// Whether certificate validation is disabled for the endpoint.
    #[serde(default)]
    pub skip_ssl_validation: bool,
    /// API version reported by the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Authorization server URL reported by the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    /// Current access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Current refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// How the tokens were obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<AuthMethod>,
    /// Targeted organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<TargetRef>,
    /// Targeted space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<TargetRef>,
}

impl Session {
    /// The endpoint and TLS mode, if an endpoint has been set.
    #[must_use]
    pub fn target(&self) -> Option<ApiTarget> {
        self.api_endpoint.as_ref().map(|endpoint| ApiTarget {
            endpoint: endpoint.clone(),
            skip_ssl_validation: self.skip_ssl_validation,
        })
    }

    /// The endpoint description recorded at login.
    #[must_use]
    pub fn endpoint_info(&self) -> Option<EndpointInfo> {
        self.authorization_endpoint
            .as_ref()
            .map(|authorization_endpoint| EndpointInfo {
                api_version: self.api_version.clone().unwrap_or_default(),
                authorization_endpoint: authorization_endpoint.clone(),
            })
    }

    /// The stored tokens, if logged in.
    #[must_use]
    pub fn tokens(&self) -> Option<TokenPair> {
        self.access_token.as_ref().map(|access_token| TokenPair {
            access_token: access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            token_type: "bearer".to_string(),
        })
    }

    /// Returns true if the session holds an access token.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    /// Returns true if a non-human service account is logged in.
    #[must_use]
    pub fn is_service_account(&self) -> bool {
        self.is_logged_in() && self.auth_method == Some(AuthMethod::ClientCredentials)
    }

    /// A copy with credentials and targeting cleared, keeping the endpoint.
    #[must_use]
    pub fn logged_out(&self) -> Self {
        Self {
            api_endpoint: self.api_endpoint.clone(),
            skip_ssl_validation: self.skip_ssl_validation,
            api_version: self.api_version.clone(),
            authorization_endpoint: self.authorization_endpoint.clone(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("api_endpoint", &self.api_endpoint)
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .field("api_version", &self.api_version)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("logged_in", &self.is_logged_in())
            .field("auth_method", &self.auth_method)
            .field("organization", &self.organization)
            .field("space", &self.space)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in(method: AuthMethod) -> Session {
        Session {
            api_endpoint: Some("https://api.example.com".into()),
            skip_ssl_validation: true,
            api_version: Some("2.150.0".into()),
            authorization_endpoint: Some("https://login.example.com".into()),
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            auth_method: Some(method),
            organization: Some(TargetRef {
                guid: "org-guid".into(),
                name: "org".into(),
            }),
            space: Some(TargetRef {
                guid: "space-guid".into(),
                name: "space".into(),
            }),
        }
    }

    #[test]
    fn default_session_is_empty() {
        let session = Session::default();
        assert!(session.target().is_none());
        assert!(session.tokens().is_none());
        assert!(!session.is_logged_in());
        assert!(!session.is_service_account());
    }

    #[test]
    fn service_account_detection() {
        assert!(logged_in(AuthMethod::ClientCredentials).is_service_account());
        assert!(!logged_in(AuthMethod::Password).is_service_account());

        let mut stale = logged_in(AuthMethod::ClientCredentials);
        stale.access_token = None;
        assert!(!stale.is_service_account());
    }

    #[test]
    fn logged_out_keeps_endpoint_and_tls_mode() {
        let session = logged_in(AuthMethod::Password).logged_out();
        assert_eq!(session.api_endpoint.as_deref(), Some("https://api.example.com"));
        assert!(session.skip_ssl_validation);
        assert!(session.endpoint_info().is_some());
        assert!(session.tokens().is_none());
        assert!(session.auth_method.is_none());
        assert!(session.organization.is_none());
        assert!(session.space.is_none());
    }

    #[test]
    fn tokens_default_to_bearer() {
        let tokens = logged_in(AuthMethod::Password).tokens().expect("tokens");
        assert_eq!(tokens.authorization(), "Bearer access");
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn debug_hides_tokens() {
        let rendered = format!("{:?}", logged_in(AuthMethod::Password));
        assert!(!rendered.contains("access\""));
        assert!(!rendered.contains("refresh\""));
        assert!(rendered.contains("logged_in: true"));
    }

    #[test]
    fn serializes_auth_method_as_snake_case() {
        let json = serde_json::to_string(&logged_in(AuthMethod::ClientCredentials)).expect("json");
        assert!(json.contains(r#""auth_method":"client_credentials""#));
    }
}

//! Login requests and their usage rules.

use std::fmt;

use stratus_api::AuthMethod;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Everything the operator supplied for one login attempt.
///
/// Fields mirror the command-line flags. `sso_passcode` is `Some("")` when
/// the flag was given without a value.
#[derive(Clone, Default)]
pub struct LoginRequest {
    /// API endpoint; falls back to the saved endpoint, then a prompt.
    pub endpoint: Option<String>,
    /// Accept untrusted certificates.
    pub skip_ssl_validation: bool,
    /// Username, or client ID with `client_credentials`.
    pub username: Option<String>,
    /// Password, or client secret with `client_credentials`.
    pub password: Option<Zeroizing<String>>,
    /// Log in through single sign-on.
    pub sso: bool,
    /// One-time passcode from the single sign-on page.
    pub sso_passcode: Option<String>,
    /// Authenticate as a service account.
    pub client_credentials: bool,
    /// Organization to target.
    pub organization: Option<String>,
    /// Space to target.
    pub space: Option<String>,
    /// Whether missing values may be prompted for.
    pub interactive: bool,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("endpoint", &self.endpoint)
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("sso", &self.sso)
            .field("sso_passcode", &self.sso_passcode.as_ref().map(|_| "[REDACTED]"))
            .field("client_credentials", &self.client_credentials)
            .field("organization", &self.organization)
            .field("space", &self.space)
            .field("interactive", &self.interactive)
            .finish()
    }
}

/// The credential method chosen by a valid request.
#[derive(Clone)]
pub(crate) enum Selector {
    Password {
        username: Option<String>,
        password: Option<Zeroizing<String>>,
    },
    Sso,
    SsoPasscode(Zeroizing<String>),
    ClientCredentials {
        client_id: String,
        client_secret: Zeroizing<String>,
    },
}

impl Selector {
    pub(crate) const fn method(&self) -> AuthMethod {
        match self {
            Self::Password { .. } => AuthMethod::Password,
            Self::Sso => AuthMethod::Sso,
            Self::SsoPasscode(_) => AuthMethod::SsoPasscode,
            Self::ClientCredentials { .. } => AuthMethod::ClientCredentials,
        }
    }
}

impl LoginRequest {
    /// Checks flag combinations and picks the credential method.
    ///
    /// Runs before anything touches the network or the session.
    pub(crate) fn selector(&self) -> Result<Selector> {
        let passcode = self.sso_passcode.as_deref();

        if self.sso && passcode.is_some() {
            return Err(Error::usage("--sso-passcode flag cannot be used with --sso"));
        }
        if passcode.is_some_and(|p| p.trim().is_empty()) {
            return Err(Error::usage("expected argument for flag `--sso-passcode'"));
        }
        if self.client_credentials && (self.sso || passcode.is_some()) {
            return Err(Error::usage(
                "--client-credentials cannot be used with --sso or --sso-passcode",
            ));
        }

        let username = non_blank(self.username.as_deref());
        let password = self.password.as_ref().filter(|p| !p.is_empty()).cloned();

        if self.client_credentials {
            return match (username, password) {
                (Some(client_id), Some(client_secret)) => Ok(Selector::ClientCredentials {
                    client_id,
                    client_secret,
                }),
                _ => Err(Error::usage(
                    "--client-credentials requires a client ID and a client secret",
                )),
            };
        }

        if self.sso || passcode.is_some() {
            if username.is_some() || password.is_some() {
                return Err(Error::usage(
                    "username and password cannot be used with --sso or --sso-passcode",
                ));
            }
            return Ok(match passcode {
                Some(code) => Selector::SsoPasscode(Zeroizing::new(code.trim().to_string())),
                None => Selector::Sso,
            });
        }

        Ok(Selector::Password { username, password })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn request() -> LoginRequest {
        LoginRequest::default()
    }

    fn usage_message(request: &LoginRequest) -> String {
        match request.selector() {
            Err(Error::Usage(message)) => message,
            Err(other) => panic!("expected usage error, got {other:?}"),
            Ok(selector) => panic!("expected usage error, got {:?}", selector.method()),
        }
    }

    #[test]
    fn sso_with_passcode_is_rejected() {
        let req = LoginRequest {
            sso: true,
            sso_passcode: Some("123456".into()),
            ..request()
        };
        assert_eq!(
            usage_message(&req),
            "--sso-passcode flag cannot be used with --sso"
        );
    }

    #[test]
    fn sso_with_empty_passcode_reports_the_conflict_first() {
        let req = LoginRequest {
            sso: true,
            sso_passcode: Some(String::new()),
            ..request()
        };
        assert_eq!(
            usage_message(&req),
            "--sso-passcode flag cannot be used with --sso"
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    fn missing_passcode_names_the_flag(value: &str) {
        let req = LoginRequest {
            sso_passcode: Some(value.into()),
            ..request()
        };
        assert_eq!(
            usage_message(&req),
            "expected argument for flag `--sso-passcode'"
        );
    }

    #[test]
    fn client_credentials_reject_human_selectors() {
        let req = LoginRequest {
            client_credentials: true,
            sso: true,
            username: Some("id".into()),
            password: Some(Zeroizing::new("secret".into())),
            ..request()
        };
        assert!(usage_message(&req).contains("--client-credentials"));
    }

    #[test]
    fn client_credentials_need_both_values() {
        let req = LoginRequest {
            client_credentials: true,
            username: Some("id".into()),
            ..request()
        };
        assert!(usage_message(&req).contains("client secret"));
    }

    #[test]
    fn sso_rejects_username() {
        let req = LoginRequest {
            sso: true,
            username: Some("admin".into()),
            ..request()
        };
        assert!(usage_message(&req).contains("--sso"));
    }

    #[test_case(request(), AuthMethod::Password ; "password by default")]
    #[test_case(LoginRequest { sso: true, ..request() }, AuthMethod::Sso ; "sso")]
    #[test_case(LoginRequest { sso_passcode: Some("123".into()), ..request() }, AuthMethod::SsoPasscode ; "passcode")]
    #[test_case(
        LoginRequest {
            client_credentials: true,
            username: Some("id".into()),
            password: Some(Zeroizing::new("secret".into())),
            ..request()
        },
        AuthMethod::ClientCredentials ;
        "client credentials"
    )]
    fn valid_requests_pick_one_method(req: LoginRequest, expected: AuthMethod) {
        let selector = req.selector().expect("valid request");
        assert_eq!(selector.method(), expected);
    }

    #[test]
    fn blank_username_counts_as_missing() {
        let req = LoginRequest {
            username: Some("  ".into()),
            ..request()
        };
        match req.selector().expect("valid") {
            Selector::Password { username, .. } => assert!(username.is_none()),
            _ => panic!("expected password selector"),
        }
    }

    #[test]
    fn debug_hides_secrets() {
        let req = LoginRequest {
            password: Some(Zeroizing::new("hunter2".into())),
            sso_passcode: Some("987654".into()),
            ..request()
        };
        let rendered = format!("{req:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("987654"));
    }
}

//! Request tracing with private data hidden.
//!
//! Tracing is configured once through [`TraceConfig`] and handed to the HTTP
//! client at construction; there is no process-wide switch.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Replacement text for redacted values.
pub const PRIVATE_DATA_PLACEHOLDER: &str = "[PRIVATE DATA HIDDEN]";

static JSON_SECRET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)"(password|auth_password|client_secret|access_token|refresh_token|passcode|token)"\s*:\s*"(?:[^"\\]|\\.)*""#,
    )
    .unwrap_or_else(|_| unreachable!())
});

static FORM_SECRET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(password|client_secret|passcode|refresh_token)=[^&\s]*")
        .unwrap_or_else(|_| unreachable!())
});

static AUTH_HEADER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^(authorization|set-cookie):.*$").unwrap_or_else(|_| unreachable!())
});

/// Hides secrets in a request or response dump.
///
/// Covers JSON string fields, form-encoded pairs and credential headers.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let json = JSON_SECRET_REGEX.replace_all(input, |caps: &regex::Captures<'_>| {
        format!(r#""{}":"{PRIVATE_DATA_PLACEHOLDER}""#, &caps[1])
    });
    let form = FORM_SECRET_REGEX.replace_all(&json, |caps: &regex::Captures<'_>| {
        format!("{}={PRIVATE_DATA_PLACEHOLDER}", &caps[1])
    });
    AUTH_HEADER_REGEX
        .replace_all(&form, |caps: &regex::Captures<'_>| {
            format!("{}: {PRIVATE_DATA_PLACEHOLDER}", &caps[1])
        })
        .into_owned()
}

/// Where request traces go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TraceConfig {
    /// No tracing.
    #[default]
    Off,
    /// Print traces to standard output.
    Stdout,
    /// Append traces to a file.
    File(PathBuf),
}

impl TraceConfig {
    /// Interprets a trace setting such as the `STRATUS_TRACE` variable.
    ///
    /// `true` traces to stdout, empty or `false` disables tracing, anything
    /// else is a file path.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Off,
            Some(v) if v.eq_ignore_ascii_case("false") => Self::Off,
            Some(v) if v.eq_ignore_ascii_case("true") => Self::Stdout,
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }

    /// Returns true if tracing is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// Direction of a traced message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Outgoing request.
    Request,
    /// Incoming response.
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => write!(f, "REQUEST"),
            Self::Response => write!(f, "RESPONSE"),
        }
    }
}

/// Writes sanitized request and response dumps to the configured sink.
#[derive(Debug, Clone, Default)]
pub struct Tracer {
    config: TraceConfig,
}

impl Tracer {
    /// Creates a tracer for `config`.
    #[must_use]
    pub const fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    /// Returns true if tracing is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Records one message. Sink failures are logged and otherwise ignored.
    pub fn record(&self, direction: Direction, head: &str, body: &str) {
        if !self.is_enabled() {
            return;
        }
        let entry = format_entry(direction, head, body);
        if let Err(e) = self.write(&entry) {
            warn!(error = %e, "failed to write request trace");
        }
    }

    fn write(&self, entry: &str) -> io::Result<()> {
        match &self.config {
            TraceConfig::Off => Ok(()),
            TraceConfig::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(entry.as_bytes())
            }
            TraceConfig::File(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(entry.as_bytes())
            }
        }
    }
}

/// Formats one trace entry with a timestamp header.
#[must_use]
pub fn format_entry(direction: Direction, head: &str, body: &str) -> String {
    let mut entry = format!(
        "\n{direction}: [{}]\n{}\n",
        Utc::now().to_rfc3339(),
        sanitize(head.trim_end())
    );
    if !body.is_empty() {
        entry.push('\n');
        entry.push_str(&sanitize(body));
        entry.push('\n');
    }
    entry
}

//! Output formatting for CLI commands.
//!
//! Results go to stdout as a table or JSON. Warnings and errors always go to
//! stderr as plain lines, whatever the format.

use std::io::Write;

use serde::Serialize;
use stratus_api::{Buildpack, ServiceBroker, Warnings};
use stratus_session::Session;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Writes a progress line such as `OK`; suppressed for JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn status<W: Write>(&self, writer: &mut W, line: &str) -> Result<(), CliError> {
        if !self.is_json() {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Writes warnings one per line, in order, duplicates included.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_warnings<W: Write>(writer: &mut W, warnings: &Warnings) -> Result<(), CliError> {
    for warning in warnings {
        writeln!(writer, "{warning}")?;
    }
    Ok(())
}

/// Writes an error message followed by its hint, if any.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_error<W: Write>(writer: &mut W, error: &CliError) -> Result<(), CliError> {
    writeln!(writer, "FAILED")?;
    writeln!(writer, "{error}")?;
    if let Some(hint) = error.hint() {
        writeln!(writer, "TIP: {hint}")?;
    }
    Ok(())
}

/// The endpoint, user and targets of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    /// API endpoint, if set.
    pub api_endpoint: Option<String>,
    /// API version reported by the endpoint.
    pub api_version: Option<String>,
    /// Whether a login is saved.
    pub logged_in: bool,
    /// How the saved login authenticated.
    pub auth_method: Option<String>,
    /// Targeted organization name.
    pub organization: Option<String>,
    /// Targeted space name.
    pub space: Option<String>,
}

impl From<&Session> for TargetSummary {
    fn from(session: &Session) -> Self {
        Self {
            api_endpoint: session.api_endpoint.clone(),
            api_version: session.api_version.clone(),
            logged_in: session.is_logged_in(),
            auth_method: session.auth_method.map(|m| m.to_string()),
            organization: session.organization.as_ref().map(|o| o.name.clone()),
            space: session.space.as_ref().map(|s| s.name.clone()),
        }
    }
}

impl TableDisplay for TargetSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        match (&self.api_endpoint, &self.api_version) {
            (Some(endpoint), Some(version)) => {
                writeln!(writer, "API endpoint:   {endpoint} (API version: {version})")?;
            }
            (Some(endpoint), None) => writeln!(writer, "API endpoint:   {endpoint}")?,
            (None, _) => {
                writeln!(writer, "No API endpoint set. Use 'stratus api' to set an endpoint.")?;
                return Ok(());
            }
        }
        if !self.logged_in {
            writeln!(writer, "Not logged in. Use 'stratus login' to log in.")?;
            return Ok(());
        }
        writeln!(
            writer,
            "Auth method:    {}",
            self.auth_method.as_deref().unwrap_or("-")
        )?;
        match &self.organization {
            Some(org) => writeln!(writer, "Org:            {org}")?,
            None => writeln!(writer, "Org:            No org targeted, use 'stratus target -o ORG'")?,
        }
        match &self.space {
            Some(space) => writeln!(writer, "Space:          {space}")?,
            None => writeln!(
                writer,
                "Space:          No space targeted, use 'stratus target -s SPACE'"
            )?,
        }
        Ok(())
    }
}

/// Service broker listing.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ServiceBrokerList(pub Vec<ServiceBroker>);

impl TableDisplay for ServiceBrokerList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.0.is_empty() {
            writeln!(writer, "No service brokers found")?;
            return Ok(());
        }
        writeln!(writer, "{:<32}  {:<48}  SPACE", "NAME", "URL")?;
        writeln!(writer, "{}", "─".repeat(96))?;
        for broker in &self.0 {
            writeln!(
                writer,
                "{:<32}  {:<48}  {}",
                truncate(&broker.name, 32),
                truncate(&broker.broker_url, 48),
                broker.space_guid.as_deref().unwrap_or("-")
            )?;
        }
        Ok(())
    }
}

impl TableDisplay for ServiceBroker {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Service Broker: {}", self.name)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "GUID:           {}", self.guid)?;
        writeln!(writer, "URL:            {}", self.broker_url)?;
        writeln!(writer, "Username:       {}", self.auth_username)?;
        if let Some(space) = &self.space_guid {
            writeln!(writer, "Space:          {space}")?;
        }
        Ok(())
    }
}

/// Buildpack listing.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct BuildpackList(pub Vec<Buildpack>);

impl TableDisplay for BuildpackList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.0.is_empty() {
            writeln!(writer, "No buildpacks found")?;
            return Ok(());
        }
        writeln!(
            writer,
            "{:>8}  {:<32}  {:<16}  {:<8}  {:<8}  FILENAME",
            "POSITION", "NAME", "STACK", "ENABLED", "LOCKED"
        )?;
        writeln!(writer, "{}", "─".repeat(96))?;
        for buildpack in &self.0 {
            writeln!(
                writer,
                "{:>8}  {:<32}  {:<16}  {:<8}  {:<8}  {}",
                buildpack.position,
                truncate(&buildpack.name, 32),
                truncate(buildpack.stack.as_deref().unwrap_or("-"), 16),
                buildpack.enabled,
                buildpack.locked,
                buildpack.filename.as_deref().unwrap_or("-")
            )?;
        }
        Ok(())
    }
}

impl TableDisplay for Buildpack {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Buildpack: {}", self.name)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "GUID:           {}", self.guid)?;
        writeln!(writer, "Position:       {}", self.position)?;
        writeln!(writer, "Enabled:        {}", self.enabled)?;
        writeln!(writer, "Locked:         {}", self.locked)?;
        writeln!(
            writer,
            "Stack:          {}",
            self.stack.as_deref().unwrap_or("-")
        )?;
        Ok(())
    }
}

/// Cuts `s` to at most `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

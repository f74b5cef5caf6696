//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// stratus - command-line client for the platform control plane.
#[derive(Parser, Debug, Clone)]
#[command(name = "stratus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Directory holding `.stratus/config.json` (defaults to the home directory).
    #[arg(long, env = "STRATUS_HOME", global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Trace HTTP traffic: `true` for stdout, or a file path.
    #[arg(long, env = "STRATUS_TRACE", global = true, value_name = "TARGET")]
    pub trace: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "STRATUS_TIMEOUT", global = true, default_value_t = 30)]
    pub timeout: u64,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in interactively.
    Login(LoginArgs),

    /// Authenticate non-interactively.
    Auth(AuthArgs),

    /// Log out, keeping the API endpoint.
    Logout,

    /// Show or set the API endpoint.
    Api(ApiArgs),

    /// Show or set the targeted organization and space.
    Target(TargetArgs),

    /// Register a service broker.
    CreateServiceBroker(CreateServiceBrokerArgs),

    /// List service brokers.
    ServiceBrokers,

    /// Show one service broker.
    ServiceBroker {
        /// Service broker name.
        name: String,
    },

    /// Create a buildpack record.
    CreateBuildpack(CreateBuildpackArgs),

    /// List buildpacks.
    Buildpacks,
}

/// Arguments for `login`.
#[derive(Args, Debug, Clone, Default)]
pub struct LoginArgs {
    /// API endpoint (e.g. https://api.example.com).
    #[arg(short = 'a', long = "api", value_name = "URL")]
    pub api: Option<String>,

    /// Username.
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password.
    #[arg(short, long)]
    pub password: Option<String>,

    /// Prompt for a one-time passcode to log in.
    #[arg(long)]
    pub sso: bool,

    /// One-time passcode.
    #[arg(long, value_name = "PASSCODE", num_args = 0..=1, default_missing_value = "")]
    pub sso_passcode: Option<String>,

    /// Organization to target.
    #[arg(short, long)]
    pub org: Option<String>,

    /// Space to target.
    #[arg(short, long)]
    pub space: Option<String>,

    /// Skip verification of the API endpoint's certificate. Not recommended.
    #[arg(long)]
    pub skip_ssl_validation: bool,
}

/// Arguments for `auth`.
#[derive(Args, Debug, Clone)]
pub struct AuthArgs {
    /// Username, or client ID with `--client-credentials`.
    pub username: String,

    /// Password, or client secret with `--client-credentials`.
    pub password: String,

    /// Authenticate as a service account with client credentials.
    #[arg(long)]
    pub client_credentials: bool,
}

/// Arguments for `api`.
#[derive(Args, Debug, Clone, Default)]
pub struct ApiArgs {
    /// New API endpoint; shows the current one if omitted.
    pub url: Option<String>,

    /// Skip verification of the API endpoint's certificate. Not recommended.
    #[arg(long)]
    pub skip_ssl_validation: bool,
}

/// Arguments for `target`.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Organization.
    #[arg(short, long)]
    pub org: Option<String>,

    /// Space.
    #[arg(short, long)]
    pub space: Option<String>,
}

/// Arguments for `create-service-broker`.
#[derive(Args, Debug, Clone)]
pub struct CreateServiceBrokerArgs {
    /// Service broker name.
    pub name: String,

    /// Username the platform uses to call the broker.
    pub username: String,

    /// Password the platform uses to call the broker.
    pub password: String,

    /// Broker URL.
    pub url: String,

    /// Make the broker's plans visible only in the targeted space.
    #[arg(long)]
    pub space_scoped: bool,
}

/// Arguments for `create-buildpack`.
#[derive(Args, Debug, Clone)]
pub struct CreateBuildpackArgs {
    /// Buildpack name.
    pub name: String,

    /// Position in the detection order, starting at 1.
    pub position: Option<u32>,

    /// Create the buildpack disabled.
    #[arg(long)]
    pub disable: bool,

    /// Stack the buildpack runs on.
    #[arg(long)]
    pub stack: Option<String>,
}

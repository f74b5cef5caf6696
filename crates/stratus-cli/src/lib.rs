//! # stratus-cli
//!
//! The `stratus` command-line client.
//!
//! Provides commands for:
//! - Logging in and out, and choosing the API endpoint and targets
//! - Registering and listing service brokers
//! - Creating and listing buildpacks
//!
//! # Architecture
//!
//! Commands are thin: they map flags onto the login flow in `stratus-login`
//! or the resource operations in `stratus-actor`, then render the result.
//!
//! ```text
//! ┌─────────────┐    ┌────────────────┐    ┌─────────────┐    ┌───────────────┐
//! │ stratus-cli │───►│ login / actor  │───►│ stratus-api │───►│ control plane │
//! └─────────────┘    └────────────────┘    └─────────────┘    └───────────────┘
//!                            │
//!                            ▼
//!                    ┌─────────────────┐
//!                    │ stratus-session │
//!                    └─────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod prompt;

pub use cli::{Cli, Commands, Format};
pub use config::Settings;
pub use error::CliError;
pub use output::OutputFormat;
pub use prompt::TerminalPrompter;

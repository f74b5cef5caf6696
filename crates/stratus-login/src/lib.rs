//! # stratus-login
//!
//! The credential resolver: how `stratus login`, `auth`, `logout`, `api` and
//! `target` turn operator input into a saved [`Session`](stratus_session::Session).
//!
//! A login resolves the endpoint, checks TLS trust, collects exactly one kind
//! of credentials, authenticates once and settles the organization and space
//! before writing the session in a single step. Nothing is written on failure
//! or cancellation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod prompt;
pub mod request;
pub mod resolver;


pub use error::{Error, Result, SKIP_SSL_HINT};
pub use prompt::Prompter;
#[cfg(any(test, feature = "test-util"))]
pub use prompt::ScriptedPrompter;
pub use request::LoginRequest;
pub use resolver::{CredentialResolver, ENDPOINT_PROMPT, INSECURE_ENDPOINT_WARNING, LoginState};

//! # stratus-api
//!
//! The control-plane client contract shared by every stratus command.
//!
//! - [`ControlPlaneClient`]: the operations the core needs from the remote API
//! - [`HttpClient`]: the HTTP implementation of that contract
//! - [`Filter`]: query predicates for list endpoints
//! - [`Warnings`] and [`Warned`]: ordered diagnostics travelling with results
//! - [`trace`]: request tracing with private data hidden
//!
//! With the `test-util` feature, [`fake::FakeControlPlaneClient`] provides a
//! deterministic substitute for tests in dependent crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod credentials;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod filter;
pub mod http;
pub mod trace;
pub mod types;
pub mod warnings;

pub use client::{ApiWarned, ControlPlaneClient};
pub use credentials::{AuthMethod, Credentials, TokenPair};
pub use error::{ApiError, Result};
pub use filter::{Filter, FilterKind, FilterOperator};
pub use http::{HttpClient, HttpClientConfig};
pub use trace::TraceConfig;
pub use types::{
    ApiTarget, Buildpack, BuildpackRequest, EndpointInfo, Organization, ServiceBroker, Space,
};
pub use warnings::{Warned, Warnings};

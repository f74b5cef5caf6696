//! Command implementations.
//!
//! Each command writes its result to `out` and its warnings to `err`, so the
//! binary can route them to stdout and stderr and tests can capture both.

pub mod buildpack;
pub mod service_broker;
pub mod session;

pub use buildpack::BuildpackCommand;
pub use service_broker::ServiceBrokerCommand;
pub use session::{MAX_LOGIN_ATTEMPTS, SessionCommand};

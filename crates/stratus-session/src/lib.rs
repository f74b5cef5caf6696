//! # stratus-session
//!
//! The persisted login session: API endpoint, TLS mode, tokens, how they were
//! obtained, and the targeted organization and space.
//!
//! [`SessionStore`] is the only way in or out. [`FileSessionStore`] keeps the
//! session as JSON under `$STRATUS_HOME/.stratus/config.json` and replaces it
//! with an atomic rename.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod session;
pub mod store;

pub use error::{Error, Result};
pub use session::{Session, TargetRef};
#[cfg(any(test, feature = "test-util"))]
pub use store::MemorySessionStore;
pub use store::{FileSessionStore, HOME_ENV, SessionStore};

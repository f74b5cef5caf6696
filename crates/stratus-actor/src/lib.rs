//! # stratus-actor
//!
//! Resource operations built on [`stratus_api::ControlPlaneClient`].
//!
//! Every operation returns a [`Warned`](stratus_api::Warned): the result plus
//! every warning the underlying calls produced, in call order, whether or not
//! the operation succeeded. Control-plane errors are returned as
//! [`Error::Api`] without being reworded.
//!
//! ```ignore
//! let actor = Actor::new(client);
//! let outcome = actor.service_broker_by_name("my-broker").await;
//! for warning in &outcome.warnings {
//!     eprintln!("{warning}");
//! }
//! let broker = outcome.result?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod actor;
mod buildpack;
pub mod error;
mod service_broker;

pub use actor::Actor;
pub use error::{Error, Result};

//! The actor wraps one control-plane client.

use stratus_api::{ControlPlaneClient, Filter};
use tracing::debug;

/// Resource operations over a [`ControlPlaneClient`].
///
/// Operations are stateless: each one validates its input, issues its calls in
/// order and returns the result with every warning those calls produced.
#[derive(Debug)]
pub struct Actor<C> {
    client: C,
}

impl<C: ControlPlaneClient> Actor<C> {
    /// Creates an actor issuing calls through `client`.
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Consumes the actor, returning the client.
    pub fn into_client(self) -> C {
        self.client
    }
}

/// Takes the first of the entities matched by a name filter.
///
/// Names are not unique on the control plane; extra matches are logged.
pub(crate) fn first_match<T>(kind: &str, filter: &Filter, matches: Vec<T>) -> Option<T> {
    if matches.len() > 1 {
        debug!(
            kind,
            filter = %filter,
            count = matches.len(),
            "name matched several resources, using the first"
        );
    }
    matches.into_iter().next()
}

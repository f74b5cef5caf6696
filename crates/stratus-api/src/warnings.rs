//! Ordered warnings and the `(result, warnings)` exchange unit.
//!
//! Every list or create call against the control plane produces zero or more
//! human-readable warnings alongside its result. Warnings are kept in the order
//! they were produced and are never deduplicated, so the operator sees them in
//! causal order.

use std::fmt;

use serde::Serialize;

/// An ordered sequence of non-fatal diagnostic messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Warnings(Vec<String>);

impl Warnings {
    /// Creates an empty warning list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a single warning.
    pub fn push(&mut self, warning: impl Into<String>) {
        self.0.push(warning.into());
    }

    /// Appends every warning of `other`, preserving its order.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Absorbs the warnings of a finished call and hands back its result.
    ///
    /// The warnings are appended whether or not the call failed.
    pub fn absorb<T, E>(&mut self, outcome: Warned<T, E>) -> Result<T, E> {
        self.extend(outcome.warnings);
        outcome.result
    }

    /// Returns the warnings as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no warnings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the warnings in order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Consumes the list, returning the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for Warnings {
    fn from(warnings: Vec<String>) -> Self {
        Self(warnings)
    }
}

impl<const N: usize> From<[&str; N]> for Warnings {
    fn from(warnings: [&str; N]) -> Self {
        Self(warnings.iter().map(|w| (*w).to_string()).collect())
    }
}

impl IntoIterator for Warnings {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Warnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\n"))
    }
}

/// A call result paired with the warnings gathered while producing it.
///
/// This is the unit of exchange at every client and actor boundary. The
/// warnings are populated even when `result` is an error, reflecting progress
/// made before the failure.
#[derive(Debug)]
#[must_use]
pub struct Warned<T, E> {
    /// The outcome of the call.
    pub result: Result<T, E>,
    /// Warnings gathered in call order.
    pub warnings: Warnings,
}

impl<T, E> Warned<T, E> {
    /// Pairs a result with its warnings.
    pub const fn new(result: Result<T, E>, warnings: Warnings) -> Self {
        Self { result, warnings }
    }

    /// A successful outcome.
    pub const fn ok(value: T, warnings: Warnings) -> Self {
        Self::new(Ok(value), warnings)
    }

    /// A failed outcome that still carries the warnings gathered so far.
    pub const fn err(error: E, warnings: Warnings) -> Self {
        Self::new(Err(error), warnings)
    }

    /// Converts the error type, keeping warnings untouched.
    pub fn map_err<F, O: FnOnce(E) -> F>(self, op: O) -> Warned<T, F> {
        Warned::new(self.result.map_err(op), self.warnings)
    }

    /// Splits the outcome into its parts.
    pub fn into_parts(self) -> (Result<T, E>, Warnings) {
        (self.result, self.warnings)
    }
}

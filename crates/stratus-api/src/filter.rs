//! Query predicates for list endpoints.
//!
//! A [`Filter`] is rendered into one `q=` query parameter, so a lookup for a
//! broker named `my-broker` becomes `q=name:my-broker`.

use std::fmt;

use serde::Serialize;

/// The attribute a filter constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Resource name.
    Name,
    /// Owning organization GUID.
    OrganizationGuid,
    /// Owning space GUID.
    SpaceGuid,
}

impl FilterKind {
    /// The attribute key as it appears in the query string.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::OrganizationGuid => "organization_guid",
            Self::SpaceGuid => "space_guid",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Comparison applied between the attribute and the filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Attribute equals the single value.
    Equal,
    /// Attribute is one of the values.
    In,
    /// Attribute is greater than the value.
    GreaterThan,
    /// Attribute is less than the value.
    LessThan,
}

impl FilterOperator {
    /// The operator token used in the query string.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equal => ":",
            Self::In => " IN ",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
        }
    }
}

/// An immutable query predicate: `{kind, operator, values}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Filter {
    kind: FilterKind,
    operator: FilterOperator,
    values: Vec<String>,
}

impl Filter {
    /// Builds a filter from its parts.
    #[must_use]
    pub fn new<I, S>(kind: FilterKind, operator: FilterOperator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact-name lookup: `{name, equal, [name]}`.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(FilterKind::Name, FilterOperator::Equal, [name.into()])
    }

    /// Restricts a listing to one organization.
    #[must_use]
    pub fn organization_guid(guid: impl Into<String>) -> Self {
        Self::new(FilterKind::OrganizationGuid, FilterOperator::Equal, [guid.into()])
    }

    /// Restricts a listing to one space.
    #[must_use]
    pub fn space_guid(guid: impl Into<String>) -> Self {
        Self::new(FilterKind::SpaceGuid, FilterOperator::Equal, [guid.into()])
    }

    /// The constrained attribute.
    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        self.kind
    }

    /// The comparison operator.
    #[must_use]
    pub const fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// The values, in the order given.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Renders the filter as the value of a `q` query parameter.
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("{}{}{}", self.kind.key(), self.operator.token(), self.values.join(","))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query())
    }
}

/// Renders a set of filters as `(q, value)` query pairs.
#[must_use]
pub fn query_pairs(filters: &[Filter]) -> Vec<(&'static str, String)> {
    filters.iter().map(|f| ("q", f.to_query())).collect()
}

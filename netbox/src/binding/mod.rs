//! Typed resource binding
//!
//! The pieces every NetBox resource and data source is assembled from:
//! [`codec::FieldCodec`] maps Terraform values to typed fields and request
//! bodies, [`filter::FilterSet`] maps `filter` blocks onto list parameters,
//! [`query::ListQuery`] runs filtered listings, and
//! [`record::RecordBinding`] is the CRUD contract for one entity kind.

pub mod codec;
pub mod filter;
pub mod query;
pub mod record;

#[cfg(test)]
pub(crate) mod fake;

use thiserror::Error;
use tfplug::types::Diagnostic;

use crate::api::ApiError;

/// Bad input, detected before any network call
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a supported filter parameter")]
    UnsupportedFilter(String),

    #[error("limit must be at least 1, got {0}")]
    InvalidLimit(i64),

    #[error("failed to compile name regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("exactly one of `{0}` must be specified")]
    ExactlyOneOf(&'static str),

    #[error("the argument `{0}` is required")]
    MissingAttribute(String),

    #[error("invalid value for `{attribute}`: {message}")]
    InvalidAttribute { attribute: String, message: String },

    #[error("an argument named `{0}` is not expected here")]
    UnsupportedAttribute(String),
}

#[derive(Debug, Error)]
pub enum BindingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A listing reported a total count of zero
    #[error("no result")]
    NoResult,

    #[error("more than one {kind} returned, specify a more narrow filter")]
    Ambiguous { kind: &'static str, count: i64 },

    #[error(transparent)]
    Transport(#[from] ApiError),
}

impl BindingError {
    pub fn to_diagnostic(&self, summary: &str) -> Diagnostic {
        Diagnostic::error(summary, self.to_string())
    }
}

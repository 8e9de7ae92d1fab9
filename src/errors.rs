//! # Error Handling
//!
//! Malformed keys are per-clause problems that the facade downgrades to
//! warnings, unknown associations fail the whole request (a silently
//! dropped filter can over-expose rows), and store errors propagate
//! unchanged.

use sea_orm::DbErr;
use thiserror::Error;

/// Errors produced while compiling or executing a list query.
#[derive(Debug, Error)]
pub enum ListError {
    /// A filter/search/sort key parsed to an empty field name, e.g. a bare
    /// `"_search"` or a key ending in `__`. The facade drops the single
    /// clause and records a warning rather than failing the request.
    #[error("invalid field path `{key}`: empty field name")]
    InvalidFieldPath {
        /// The raw key as received.
        key: String,
    },

    /// A key referenced an association that is not declared in the
    /// resource's registry. Fails the whole request: only explicitly
    /// declared relationships are traversable from user input.
    #[error("unknown association `{name}` referenced by `{key}`")]
    UnknownAssociation {
        /// The raw key as received.
        key: String,
        /// The association segment that did not resolve.
        name: String,
    },

    /// The association graph or the facade configuration failed validation.
    #[error("invalid list query configuration: {message}")]
    Registry {
        /// What was wrong with the declarations.
        message: String,
    },

    /// The underlying store's count or fetch query failed. Propagated
    /// unchanged; no retry, no partial result.
    #[error("store error: {0}")]
    Store(#[from] DbErr),
}

impl ListError {
    pub(crate) fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }
}

//! Error types for SPIRE value types

use thiserror::Error;

/// Result type alias using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing identities, selectors and entries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Trust domain is empty or contains characters outside `[a-z0-9._-]`
    #[error("Invalid trust domain '{0}'")]
    InvalidTrustDomain(String),

    /// Path is not empty and not a clean `/`-separated path
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// SPIFFE ID string does not have the `spiffe://` form
    #[error("Invalid SPIFFE ID '{0}'")]
    InvalidSpiffeId(String),

    /// Selector type is empty or the `type:value` form is malformed
    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    /// Required field missing from a record
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

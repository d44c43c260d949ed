//! Error types for the reconciler

use spire_core::SpiffeId;
use spire_registry::{Code, Status};
use std::fmt;
use thiserror::Error;

/// Result type for reconciler operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Lifecycle step an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Lookup,
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Lookup => "lookup",
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Import => "import",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`ReconcileError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Channel or call-level failure
    Transport,
    /// Requested id absent from the registry
    NotFound,
    /// Entry with this id or registration already exists
    Conflict,
    /// Desired input rejected locally, or a lookup that did not match exactly one entry
    Validation,
    /// Any other per-item batch failure
    OperationFailed,
}

fn entry_ref(id: &Option<String>) -> String {
    match id {
        Some(id) => format!("entry '{}'", id),
        None => "entry".to_string(),
    }
}

/// Errors returned by the reconciler
///
/// Every variant carries the lifecycle step and, when known, the entry id.
/// Registry statuses are carried unmodified.
#[derive(Error, Debug, Clone)]
pub enum ReconcileError {
    #[error("{} {}: transport failure: {}", .operation, entry_ref(.id), .source)]
    Transport {
        operation: Operation,
        id: Option<String>,
        #[source]
        source: Status,
    },

    #[error("{} entry '{}': not found", .operation, .id)]
    NotFound { operation: Operation, id: String },

    #[error("{} {}: {}", .operation, entry_ref(.id), .status)]
    Conflict {
        operation: Operation,
        id: Option<String>,
        status: Status,
    },

    #[error("{} {}: invalid input: {}", .operation, entry_ref(.id), .reason)]
    InvalidInput {
        operation: Operation,
        id: Option<String>,
        reason: String,
    },

    #[error("lookup of {} matched {} entries, expected exactly one", .spiffe_id, .matches)]
    AmbiguousLookup { spiffe_id: SpiffeId, matches: usize },

    #[error("{} {} failed: {}", .operation, entry_ref(.id), .status)]
    OperationFailed {
        operation: Operation,
        id: Option<String>,
        status: Status,
    },
}

impl ReconcileError {
    /// Build an invalid-input error
    pub fn invalid(operation: Operation, id: Option<String>, reason: impl ToString) -> Self {
        ReconcileError::InvalidInput {
            operation,
            id,
            reason: reason.to_string(),
        }
    }

    /// Map a failed batch item to the taxonomy
    pub(crate) fn from_item(operation: Operation, id: Option<String>, status: Status) -> Self {
        match status.code {
            Code::AlreadyExists => ReconcileError::Conflict {
                operation,
                id,
                status,
            },
            Code::NotFound => match id {
                Some(id) => ReconcileError::NotFound { operation, id },
                None => ReconcileError::OperationFailed {
                    operation,
                    id: None,
                    status,
                },
            },
            _ => ReconcileError::OperationFailed {
                operation,
                id,
                status,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::Transport { .. } => ErrorKind::Transport,
            ReconcileError::NotFound { .. } => ErrorKind::NotFound,
            ReconcileError::Conflict { .. } => ErrorKind::Conflict,
            ReconcileError::InvalidInput { .. } | ReconcileError::AmbiguousLookup { .. } => {
                ErrorKind::Validation
            }
            ReconcileError::OperationFailed { .. } => ErrorKind::OperationFailed,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ReconcileError::Transport { operation, .. }
            | ReconcileError::NotFound { operation, .. }
            | ReconcileError::Conflict { operation, .. }
            | ReconcileError::InvalidInput { operation, .. }
            | ReconcileError::OperationFailed { operation, .. } => *operation,
            ReconcileError::AmbiguousLookup { .. } => Operation::Lookup,
        }
    }

    /// Registry status behind the error, if any
    pub fn status(&self) -> Option<&Status> {
        match self {
            ReconcileError::Transport { source, .. } => Some(source),
            ReconcileError::Conflict { status, .. }
            | ReconcileError::OperationFailed { status, .. } => Some(status),
            _ => None,
        }
    }
}

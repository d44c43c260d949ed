//! Diagnostics returned to the host
//!
//! Every failure crosses the host boundary as a [`Diagnostic`] with a short
//! summary and a detail string. The host decides whether to stop.

use std::fmt;

use crate::config::ConfigError;
use crate::error::{ErrorKind, Operation, ReconcileError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A structured diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

impl std::error::Error for Diagnostic {}

fn failure_summary(operation: Operation) -> &'static str {
    match operation {
        Operation::Lookup => "Failed to list entries",
        Operation::Create => "Failed to create entry",
        Operation::Read => "Failed to get entry",
        Operation::Update => "Failed to update entry",
        Operation::Delete => "Failed to delete entry",
        Operation::Import => "Failed to import entry",
    }
}

impl From<ReconcileError> for Diagnostic {
    fn from(err: ReconcileError) -> Self {
        let summary = match (&err, err.kind()) {
            (ReconcileError::AmbiguousLookup { .. }, _) => {
                "Failed to find entry matching data source filter"
            }
            (_, ErrorKind::Validation) => "Invalid entry configuration",
            (_, ErrorKind::NotFound) => "Entry not found",
            (_, ErrorKind::Conflict) => "Entry already exists",
            (_, ErrorKind::Transport) | (_, ErrorKind::OperationFailed) => {
                failure_summary(err.operation())
            }
        };

        Diagnostic::error(summary, err.to_string())
    }
}

impl From<ConfigError> for Diagnostic {
    fn from(err: ConfigError) -> Self {
        Diagnostic::error("Failed to configure registry client", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spire_core::SpiffeId;
    use spire_registry::Status;

    #[test]
    fn test_transport_summary_names_operation() {
        let diag: Diagnostic = ReconcileError::Transport {
            operation: Operation::Create,
            id: None,
            source: Status::unavailable("connection refused"),
        }
        .into();

        assert!(diag.is_error());
        assert_eq!(diag.summary, "Failed to create entry");
        assert!(diag.detail.contains("connection refused"));
    }

    #[test]
    fn test_lookup_summary_carries_count() {
        let diag: Diagnostic = ReconcileError::AmbiguousLookup {
            spiffe_id: SpiffeId::new("example.org", "/svc").unwrap(),
            matches: 0,
        }
        .into();

        assert_eq!(diag.summary, "Failed to find entry matching data source filter");
        assert!(diag.detail.contains("matched 0 entries"));
    }

    #[test]
    fn test_warning_is_not_error() {
        let diag = Diagnostic::warning("Entry removed from registry", "entry 'abc' no longer exists");
        assert_eq!(diag.severity, Severity::Warning);
        assert!(!diag.is_error());
        assert_eq!(diag.to_string(), "Entry removed from registry: entry 'abc' no longer exists");
    }

    #[test]
    fn test_config_error_diagnostic() {
        let diag: Diagnostic = ConfigError::InvalidTimeout("soon".into()).into();
        assert_eq!(diag.summary, "Failed to configure registry client");
    }
}

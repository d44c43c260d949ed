//! The `spire_entry` resource
//!
//! Host-facing lifecycle for a managed registration entry. Converts host
//! models to entries, runs the reconciler, and converts the observed entry
//! back into state.

use spire_registry::CallContext;
use tracing::{trace, warn};

use crate::diagnostics::Diagnostic;
use crate::error::{ErrorKind, Operation, ReconcileError};
use crate::model::EntryResourceModel;
use crate::reconciler::EntryReconciler;

/// Result of refreshing a resource
///
/// `state` is `None` when the entry no longer exists; `diagnostics` then
/// carries a warning naming the dropped id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResponse {
    pub state: Option<EntryResourceModel>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resource implementation
#[derive(Debug, Clone)]
pub struct EntryResource {
    reconciler: EntryReconciler,
    ctx: CallContext,
}

impl EntryResource {
    pub const TYPE_NAME: &'static str = "spire_entry";

    pub fn new(reconciler: EntryReconciler, ctx: CallContext) -> Self {
        Self { reconciler, ctx }
    }

    /// Create the entry described by the plan
    pub async fn create(&self, plan: EntryResourceModel) -> Result<EntryResourceModel, Diagnostic> {
        let desired = plan
            .to_entry()
            .map_err(|e| ReconcileError::invalid(Operation::Create, plan.id.clone(), e))?;

        let observed = self.reconciler.create(&self.ctx, desired).await?;
        trace!("created an entry resource");

        to_state(Operation::Create, &observed)
    }

    /// Refresh state from the registry
    ///
    /// An entry that no longer exists comes back without state, so the host
    /// drops it and plans a re-create.
    pub async fn read(&self, state: EntryResourceModel) -> Result<ReadResponse, Diagnostic> {
        let id = required_id(Operation::Read, &state)?;

        match self.reconciler.read(&self.ctx, &id).await {
            Ok(observed) => Ok(ReadResponse {
                state: Some(to_state(Operation::Read, &observed)?),
                diagnostics: Vec::new(),
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(id = %id, "Entry removed outside of configuration, dropping from state");
                Ok(ReadResponse {
                    state: None,
                    diagnostics: vec![Diagnostic::warning(
                        "Entry removed from registry",
                        format!("entry '{}' no longer exists and will be recreated", id),
                    )],
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Apply the plan to an existing entry
    pub async fn update(&self, plan: EntryResourceModel) -> Result<EntryResourceModel, Diagnostic> {
        let id = required_id(Operation::Update, &plan)?;
        let desired = plan
            .to_entry()
            .map_err(|e| ReconcileError::invalid(Operation::Update, Some(id.clone()), e))?;

        let observed = self.reconciler.update(&self.ctx, desired).await?;
        trace!(id = %id, "updated an entry resource");

        to_state(Operation::Update, &observed)
    }

    /// Delete the entry held in state
    pub async fn delete(&self, state: EntryResourceModel) -> Result<(), Diagnostic> {
        let id = required_id(Operation::Delete, &state)?;
        self.reconciler.delete(&self.ctx, &id).await?;
        trace!(id = %id, "deleted an entry resource");
        Ok(())
    }

    /// Import an existing entry by id
    pub async fn import_state(&self, id: &str) -> Result<EntryResourceModel, Diagnostic> {
        let observed = self.reconciler.import(&self.ctx, id).await?;
        to_state(Operation::Import, &observed)
    }
}

fn required_id(operation: Operation, model: &EntryResourceModel) -> Result<String, Diagnostic> {
    model
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ReconcileError::invalid(operation, None, "entry id is missing from state").into())
}

fn to_state(operation: Operation, observed: &spire_core::Entry) -> Result<EntryResourceModel, Diagnostic> {
    EntryResourceModel::from_entry(observed).map_err(|e| {
        Diagnostic::error(
            "Invalid registry response",
            format!("{} {}: {}", operation, observed.id().unwrap_or_default(), e),
        )
    })
}

//! The `spire_entry` data source
//!
//! Read-only lookup of the single entry registered for a SPIFFE ID.

use spire_core::SpiffeId;
use spire_registry::CallContext;

use crate::diagnostics::Diagnostic;
use crate::error::{Operation, ReconcileError};
use crate::model::EntryDataSourceModel;
use crate::reconciler::EntryReconciler;

/// Data source implementation
#[derive(Debug, Clone)]
pub struct EntryDataSource {
    reconciler: EntryReconciler,
    ctx: CallContext,
}

impl EntryDataSource {
    pub const TYPE_NAME: &'static str = "spire_entry";

    pub fn new(reconciler: EntryReconciler, ctx: CallContext) -> Self {
        Self { reconciler, ctx }
    }

    /// Resolve the configured SPIFFE ID to its registration entry
    pub async fn read(&self, config: EntryDataSourceModel) -> Result<EntryDataSourceModel, Diagnostic> {
        let spiffe_id = SpiffeId::try_from(&config.spiffe_id)
            .map_err(|e| ReconcileError::invalid(Operation::Lookup, None, e))?;

        let observed = self.reconciler.lookup(&self.ctx, &spiffe_id).await?;
        Ok(EntryDataSourceModel::from_entry(&observed))
    }
}

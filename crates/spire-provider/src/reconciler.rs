//! Entry reconciler
//!
//! Maps desired registration entries to registry calls and returns the
//! registry's authoritative view of each entry.
//!
//! ## Policies
//!
//! - **Lookup** requires exactly one match; zero or several matches are a
//!   validation error carrying the count.
//! - **Create** and **update** each ship a one-item batch. Observed state,
//!   selectors included, is taken from the entry the registry echoes back
//!   for that item.
//! - **Update** sends the caller's full desired selector set.
//! - **Delete** treats `NOT_FOUND` as already satisfied.
//! - **Read** and **import** surface `NOT_FOUND`; dropping the entry from
//!   state is the caller's decision.
//!
//! Nothing is cached between calls and nothing is retried.

use spire_core::{Entry, SpiffeId};
use spire_registry::CallContext;
use tracing::{info, warn};

use crate::client::{ClientError, ItemOutcome, RegistryClient};
use crate::error::{Operation, ReconcileError, Result};

/// Reconciler for registration entries
#[derive(Debug, Clone)]
pub struct EntryReconciler {
    client: RegistryClient,
}

impl EntryReconciler {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Find the single entry registered for a SPIFFE ID
    pub async fn lookup(&self, ctx: &CallContext, spiffe_id: &SpiffeId) -> Result<Entry> {
        let entries = self
            .client
            .list_by_spiffe_id(ctx, spiffe_id)
            .await
            .map_err(|e| client_error(Operation::Lookup, None, e))?;

        let matches = entries.len();
        let mut entries = entries.into_iter();

        match (entries.next(), entries.next()) {
            (Some(entry), None) => Ok(entry),
            _ => {
                warn!(spiffe_id = %spiffe_id, matches, "Lookup did not match exactly one entry");
                Err(ReconcileError::AmbiguousLookup {
                    spiffe_id: spiffe_id.clone(),
                    matches,
                })
            }
        }
    }

    /// Create an entry and return the registry's stored copy
    pub async fn create(&self, ctx: &CallContext, desired: Entry) -> Result<Entry> {
        let id = desired.id().map(str::to_string);
        validate_desired(Operation::Create, &id, &desired)?;

        let outcomes = self
            .client
            .batch_create(ctx, vec![desired])
            .await
            .map_err(|e| client_error(Operation::Create, id.clone(), e))?;

        let observed = single_outcome(Operation::Create, id, outcomes)?;

        info!(
            id = ?observed.id,
            spiffe_id = %observed.spiffe_id,
            "Created registration entry"
        );

        Ok(observed)
    }

    /// Refresh an entry by id
    pub async fn read(&self, ctx: &CallContext, id: &str) -> Result<Entry> {
        self.fetch(Operation::Read, ctx, id).await
    }

    /// Push the desired state of an existing entry
    pub async fn update(&self, ctx: &CallContext, desired: Entry) -> Result<Entry> {
        let id = desired
            .id()
            .map(str::to_string)
            .ok_or_else(|| ReconcileError::invalid(Operation::Update, None, "entry id is required"))?;
        validate_desired(Operation::Update, &Some(id.clone()), &desired)?;

        let outcomes = self
            .client
            .batch_update(ctx, vec![desired])
            .await
            .map_err(|e| client_error(Operation::Update, Some(id.clone()), e))?;

        let observed = single_outcome(Operation::Update, Some(id), outcomes)?;

        info!(
            id = ?observed.id,
            spiffe_id = %observed.spiffe_id,
            selectors = %observed.selectors,
            "Updated registration entry"
        );

        Ok(observed)
    }

    /// Delete an entry; an entry that is already gone counts as deleted
    pub async fn delete(&self, ctx: &CallContext, id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(ReconcileError::invalid(Operation::Delete, None, "entry id is required"));
        }

        let outcomes = self
            .client
            .batch_delete(ctx, vec![id.to_string()])
            .await
            .map_err(|e| client_error(Operation::Delete, Some(id.to_string()), e))?;

        match outcomes.into_iter().next() {
            Some(ItemOutcome::Success(_)) => {
                info!(id = %id, "Deleted registration entry");
                Ok(())
            }
            Some(ItemOutcome::Failed(status)) if status.code == spire_registry::Code::NotFound => {
                warn!(id = %id, "Entry already absent from registry");
                Ok(())
            }
            Some(ItemOutcome::Failed(status)) => Err(ReconcileError::OperationFailed {
                operation: Operation::Delete,
                id: Some(id.to_string()),
                status,
            }),
            None => Err(missing_result(Operation::Delete, Some(id.to_string()))),
        }
    }

    /// Resolve a bare id into a full entry
    pub async fn import(&self, ctx: &CallContext, id: &str) -> Result<Entry> {
        self.fetch(Operation::Import, ctx, id).await
    }

    async fn fetch(&self, operation: Operation, ctx: &CallContext, id: &str) -> Result<Entry> {
        if id.is_empty() {
            return Err(ReconcileError::invalid(operation, None, "entry id is required"));
        }

        self.client
            .get(ctx, id)
            .await
            .map_err(|e| client_error(operation, Some(id.to_string()), e))
    }
}

/// Entries managed as resources need a parent and at least one selector
fn validate_desired(operation: Operation, id: &Option<String>, desired: &Entry) -> Result<()> {
    if desired.parent_id.is_none() {
        return Err(ReconcileError::invalid(operation, id.clone(), "parent_id is required"));
    }

    if desired.selectors.is_empty() {
        return Err(ReconcileError::invalid(
            operation,
            id.clone(),
            "at least one selector is required",
        ));
    }

    Ok(())
}

/// Take the outcome of the one item submitted
fn single_outcome(
    operation: Operation,
    id: Option<String>,
    outcomes: Vec<ItemOutcome<Entry>>,
) -> Result<Entry> {
    match outcomes.into_iter().next() {
        Some(ItemOutcome::Success(entry)) => Ok(entry),
        Some(ItemOutcome::Failed(status)) => {
            warn!(operation = %operation, id = ?id, status = %status, "Registry rejected entry");
            Err(ReconcileError::from_item(operation, id, status))
        }
        None => Err(missing_result(operation, id)),
    }
}

fn missing_result(operation: Operation, id: Option<String>) -> ReconcileError {
    ReconcileError::OperationFailed {
        operation,
        id,
        status: spire_registry::Status::internal("registry returned no result for the item"),
    }
}

fn client_error(operation: Operation, id: Option<String>, err: ClientError) -> ReconcileError {
    match err {
        ClientError::NotFound(missing) => ReconcileError::NotFound {
            operation,
            id: missing,
        },
        ClientError::Transport(source) => {
            warn!(operation = %operation, id = ?id, error = %source, "Registry call failed");
            ReconcileError::Transport {
                operation,
                id,
                source,
            }
        }
    }
}

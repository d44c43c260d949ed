//! Registry client adapter
//!
//! Translates [`Entry`] records to and from the wire shapes of the entry API
//! and issues the calls on the shared [`EntryService`] handle. No business
//! logic and no retries live here.

use spire_core::{Entry, Selector, SelectorSet, SpiffeId};
use spire_registry::types as wire;
use spire_registry::{CallContext, Code, EntryService, Status};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Whole-call failures of the adapter
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("entry '{0}' not found")]
    NotFound(String),

    #[error("registry call failed: {0}")]
    Transport(Status),
}

/// Outcome of one item in a batch call, in request order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome<T> {
    Success(T),
    Failed(Status),
}

impl<T> ItemOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Success(_))
    }
}

/// Adapter over the shared registry handle
#[derive(Debug, Clone)]
pub struct RegistryClient {
    service: Arc<dyn EntryService>,
}

impl RegistryClient {
    pub fn new(service: Arc<dyn EntryService>) -> Self {
        Self { service }
    }

    /// The underlying registry handle
    pub fn service(&self) -> &Arc<dyn EntryService> {
        &self.service
    }

    /// List every entry registered for a SPIFFE ID
    pub async fn list_by_spiffe_id(
        &self,
        ctx: &CallContext,
        spiffe_id: &SpiffeId,
    ) -> Result<Vec<Entry>, ClientError> {
        debug!(spiffe_id = %spiffe_id, "ListEntries");

        let request = wire::ListEntriesRequest {
            filter: wire::ListEntriesFilter {
                by_spiffe_id: Some(spiffe_id_to_wire(spiffe_id)),
            },
        };

        let response = self
            .service
            .list_entries(ctx, request)
            .await
            .map_err(ClientError::Transport)?;

        response
            .entries
            .into_iter()
            .map(entry_from_wire)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ClientError::Transport)
    }

    /// Fetch one entry by id
    pub async fn get(&self, ctx: &CallContext, id: &str) -> Result<Entry, ClientError> {
        debug!(id = %id, "GetEntry");

        let request = wire::GetEntryRequest { id: id.to_string() };

        match self.service.get_entry(ctx, request).await {
            Ok(entry) => entry_from_wire(entry).map_err(ClientError::Transport),
            Err(status) if status.code == Code::NotFound => Err(ClientError::NotFound(id.to_string())),
            Err(status) => Err(ClientError::Transport(status)),
        }
    }

    /// Create entries, returning one outcome per submitted entry
    pub async fn batch_create(
        &self,
        ctx: &CallContext,
        entries: Vec<Entry>,
    ) -> Result<Vec<ItemOutcome<Entry>>, ClientError> {
        debug!(count = entries.len(), "BatchCreateEntry");

        let request = wire::BatchCreateEntryRequest {
            entries: entries.iter().map(entry_to_wire).collect(),
        };

        let response = self
            .service
            .batch_create_entry(ctx, request)
            .await
            .map_err(ClientError::Transport)?;

        Ok(response.results.into_iter().map(entry_outcome).collect())
    }

    /// Update entries by id, returning one outcome per submitted entry
    pub async fn batch_update(
        &self,
        ctx: &CallContext,
        entries: Vec<Entry>,
    ) -> Result<Vec<ItemOutcome<Entry>>, ClientError> {
        debug!(count = entries.len(), "BatchUpdateEntry");

        let request = wire::BatchUpdateEntryRequest {
            entries: entries.iter().map(entry_to_wire).collect(),
        };

        let response = self
            .service
            .batch_update_entry(ctx, request)
            .await
            .map_err(ClientError::Transport)?;

        Ok(response.results.into_iter().map(entry_outcome).collect())
    }

    /// Delete entries by id, returning one outcome per submitted id
    pub async fn batch_delete(
        &self,
        ctx: &CallContext,
        ids: Vec<String>,
    ) -> Result<Vec<ItemOutcome<String>>, ClientError> {
        debug!(count = ids.len(), "BatchDeleteEntry");

        let request = wire::BatchDeleteEntryRequest { ids };

        let response = self
            .service
            .batch_delete_entry(ctx, request)
            .await
            .map_err(ClientError::Transport)?;

        Ok(response
            .results
            .into_iter()
            .map(|result| {
                if result.status.is_ok() {
                    ItemOutcome::Success(result.id)
                } else {
                    ItemOutcome::Failed(result.status)
                }
            })
            .collect())
    }
}

fn entry_outcome(result: wire::EntryResult) -> ItemOutcome<Entry> {
    if !result.status.is_ok() {
        return ItemOutcome::Failed(result.status);
    }

    match result.entry {
        Some(entry) => match entry_from_wire(entry) {
            Ok(entry) => ItemOutcome::Success(entry),
            Err(status) => ItemOutcome::Failed(status),
        },
        None => ItemOutcome::Failed(Status::internal("registry result is missing the entry")),
    }
}

// =============================================================================
// Shape translation
// =============================================================================

fn spiffe_id_to_wire(id: &SpiffeId) -> wire::SpiffeId {
    wire::SpiffeId::new(id.trust_domain(), id.path())
}

fn spiffe_id_from_wire(field: &str, id: wire::SpiffeId) -> Result<SpiffeId, Status> {
    SpiffeId::new(id.trust_domain, id.path)
        .map_err(|e| Status::internal(format!("registry returned invalid {}: {}", field, e)))
}

/// Translate a desired entry to the wire; an unassigned id is sent empty
pub fn entry_to_wire(entry: &Entry) -> wire::Entry {
    wire::Entry {
        id: entry.id().unwrap_or_default().to_string(),
        spiffe_id: Some(spiffe_id_to_wire(&entry.spiffe_id)),
        parent_id: entry.parent_id.as_ref().map(spiffe_id_to_wire),
        selectors: entry
            .selectors
            .iter()
            .map(|s| wire::Selector::new(s.selector_type(), s.value()))
            .collect(),
    }
}

/// Translate a registry entry into an observed entry
pub fn entry_from_wire(entry: wire::Entry) -> Result<Entry, Status> {
    let spiffe_id = entry
        .spiffe_id
        .ok_or_else(|| Status::internal("registry returned entry without spiffe_id"))
        .and_then(|id| spiffe_id_from_wire("spiffe_id", id))?;

    let parent_id = entry
        .parent_id
        .map(|id| spiffe_id_from_wire("parent_id", id))
        .transpose()?;

    let selectors = entry
        .selectors
        .into_iter()
        .map(|s| Selector::new(s.selector_type, s.value))
        .collect::<Result<SelectorSet, _>>()
        .map_err(|e| Status::internal(format!("registry returned invalid selector: {}", e)))?;

    let mut observed = Entry::new(spiffe_id).with_selectors(selectors);
    observed.parent_id = parent_id;
    if !entry.id.is_empty() {
        observed.id = Some(entry.id);
    }
    Ok(observed)
}

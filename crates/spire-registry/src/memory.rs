//! In-memory registry backend
//!
//! Implements the entry API over an in-process map. Used for development,
//! by the dev registry server, and as the registry double in tests.
//! Data is lost on restart.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::{debug, info};

use crate::service::{CallContext, EntryService};
use crate::status::Status;
use crate::types::{
    BatchCreateEntryRequest, BatchCreateEntryResponse, BatchDeleteEntryRequest,
    BatchDeleteEntryResponse, BatchUpdateEntryRequest, BatchUpdateEntryResponse, DeleteResult,
    Entry, EntryResult, GetEntryRequest, ListEntriesRequest, ListEntriesResponse, Selector,
    SpiffeId,
};

/// In-memory entry registry
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: RwLock<BTreeMap<String, Entry>>,
    unavailable: AtomicBool,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `UNAVAILABLE`, as a registry that cannot
    /// be reached would
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored entries
    pub fn len(&self) -> Result<usize, Status> {
        Ok(self.read_entries()?.len())
    }

    /// Whether the registry holds no entries
    pub fn is_empty(&self) -> Result<bool, Status> {
        Ok(self.len()? == 0)
    }

    /// Look up a stored entry without going through the API
    pub fn stored(&self, id: &str) -> Result<Option<Entry>, Status> {
        Ok(self.read_entries()?.get(id).cloned())
    }

    fn check_available(&self) -> Result<(), Status> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Status::unavailable("registry is unavailable"));
        }
        Ok(())
    }

    fn read_entries(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, Entry>>, Status> {
        self.entries
            .read()
            .map_err(|_| Status::internal("registry lock poisoned"))
    }

    fn write_entries(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Entry>>, Status> {
        self.entries
            .write()
            .map_err(|_| Status::internal("registry lock poisoned"))
    }

    fn create_one(entries: &mut BTreeMap<String, Entry>, entry: Entry) -> EntryResult {
        let mut entry = match normalize(entry) {
            Ok(entry) => entry,
            Err(status) => return failed(status, None),
        };

        if !entry.id.is_empty() {
            if let Some(existing) = entries.get(&entry.id) {
                return failed(
                    Status::already_exists(format!("entry '{}' already exists", entry.id)),
                    Some(existing.clone()),
                );
            }
        }

        if let Some(existing) = entries.values().find(|e| same_registration(e, &entry)) {
            return failed(
                Status::already_exists("similar entry already exists"),
                Some(existing.clone()),
            );
        }

        if entry.id.is_empty() {
            entry.id = uuid::Uuid::new_v4().to_string();
        }

        info!(id = %entry.id, spiffe_id = %display_id(&entry.spiffe_id), "Created entry");
        entries.insert(entry.id.clone(), entry.clone());

        EntryResult {
            status: Status::ok(),
            entry: Some(entry),
        }
    }

    fn update_one(entries: &mut BTreeMap<String, Entry>, entry: Entry) -> EntryResult {
        if entry.id.is_empty() {
            return failed(Status::invalid_argument("missing entry id"), None);
        }

        if !entries.contains_key(&entry.id) {
            return failed(
                Status::not_found(format!("entry '{}' not found", entry.id)),
                None,
            );
        }

        let entry = match normalize(entry) {
            Ok(entry) => entry,
            Err(status) => return failed(status, None),
        };

        info!(
            id = %entry.id,
            spiffe_id = %display_id(&entry.spiffe_id),
            selectors = entry.selectors.len(),
            "Updated entry"
        );
        entries.insert(entry.id.clone(), entry.clone());

        EntryResult {
            status: Status::ok(),
            entry: Some(entry),
        }
    }
}

#[async_trait]
impl EntryService for MemoryRegistry {
    async fn list_entries(
        &self,
        _ctx: &CallContext,
        request: ListEntriesRequest,
    ) -> Result<ListEntriesResponse, Status> {
        self.check_available()?;
        let entries = self.read_entries()?;

        let entries: Vec<Entry> = entries
            .values()
            .filter(|e| match &request.filter.by_spiffe_id {
                Some(filter) => e.spiffe_id.as_ref() == Some(filter),
                None => true,
            })
            .cloned()
            .collect();

        debug!(count = entries.len(), "Listed entries");
        Ok(ListEntriesResponse { entries })
    }

    async fn get_entry(&self, _ctx: &CallContext, request: GetEntryRequest) -> Result<Entry, Status> {
        self.check_available()?;
        let entries = self.read_entries()?;

        entries
            .get(&request.id)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("entry '{}' not found", request.id)))
    }

    async fn batch_create_entry(
        &self,
        _ctx: &CallContext,
        request: BatchCreateEntryRequest,
    ) -> Result<BatchCreateEntryResponse, Status> {
        self.check_available()?;
        let mut entries = self.write_entries()?;

        let results = request
            .entries
            .into_iter()
            .map(|entry| Self::create_one(&mut entries, entry))
            .collect();

        Ok(BatchCreateEntryResponse { results })
    }

    async fn batch_update_entry(
        &self,
        _ctx: &CallContext,
        request: BatchUpdateEntryRequest,
    ) -> Result<BatchUpdateEntryResponse, Status> {
        self.check_available()?;
        let mut entries = self.write_entries()?;

        let results = request
            .entries
            .into_iter()
            .map(|entry| Self::update_one(&mut entries, entry))
            .collect();

        Ok(BatchUpdateEntryResponse { results })
    }

    async fn batch_delete_entry(
        &self,
        _ctx: &CallContext,
        request: BatchDeleteEntryRequest,
    ) -> Result<BatchDeleteEntryResponse, Status> {
        self.check_available()?;
        let mut entries = self.write_entries()?;

        let results = request
            .ids
            .into_iter()
            .map(|id| {
                let status = if entries.remove(&id).is_some() {
                    info!(id = %id, "Deleted entry");
                    Status::ok()
                } else {
                    Status::not_found(format!("entry '{}' not found", id))
                };
                DeleteResult { status, id }
            })
            .collect();

        Ok(BatchDeleteEntryResponse { results })
    }
}

fn failed(status: Status, entry: Option<Entry>) -> EntryResult {
    EntryResult { status, entry }
}

fn display_id(id: &Option<SpiffeId>) -> String {
    match id {
        Some(id) => format!("spiffe://{}{}", id.trust_domain, id.path),
        None => String::new(),
    }
}

/// Validate an incoming entry and canonicalise its selectors
fn normalize(mut entry: Entry) -> Result<Entry, Status> {
    check_spiffe_id("spiffe_id", entry.spiffe_id.as_ref())?;
    check_spiffe_id("parent_id", entry.parent_id.as_ref())?;

    if entry.selectors.is_empty() {
        return Err(Status::invalid_argument("selector list is empty"));
    }

    if let Some(bad) = entry.selectors.iter().find(|s| s.selector_type.is_empty()) {
        return Err(Status::invalid_argument(format!(
            "invalid selector: missing type for value '{}'",
            bad.value
        )));
    }

    let selectors: BTreeSet<Selector> = entry.selectors.into_iter().collect();
    entry.selectors = selectors.into_iter().collect();
    Ok(entry)
}

fn check_spiffe_id(field: &str, id: Option<&SpiffeId>) -> Result<(), Status> {
    let id = id.ok_or_else(|| Status::invalid_argument(format!("missing {}", field)))?;

    if id.trust_domain.is_empty() {
        return Err(Status::invalid_argument(format!(
            "invalid {}: trust domain is missing",
            field
        )));
    }

    if !id.path.is_empty() && !id.path.starts_with('/') {
        return Err(Status::invalid_argument(format!(
            "invalid {}: path must have a leading slash",
            field
        )));
    }

    Ok(())
}

/// Two entries register the same workload when SPIFFE ID, parent ID and
/// selector set all match
fn same_registration(a: &Entry, b: &Entry) -> bool {
    a.spiffe_id == b.spiffe_id && a.parent_id == b.parent_id && a.selectors == b.selectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Code;

    fn entry(path: &str, uid: &str) -> Entry {
        Entry {
            id: String::new(),
            spiffe_id: Some(SpiffeId::new("example.org", path)),
            parent_id: Some(SpiffeId::new("example.org", "/path")),
            selectors: vec![Selector::new("unix", uid)],
        }
    }

    async fn create(registry: &MemoryRegistry, entry: Entry) -> EntryResult {
        let response = registry
            .batch_create_entry(&CallContext::new(), BatchCreateEntryRequest { entries: vec![entry] })
            .await
            .unwrap();
        response.results.into_iter().next().unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let registry = MemoryRegistry::new();

        let result = create(&registry, entry("/svc", "uid:501")).await;
        assert!(result.status.is_ok());

        let created = result.entry.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_keeps_caller_id() {
        let registry = MemoryRegistry::new();

        let mut desired = entry("/svc", "uid:501");
        desired.id = "abc-123".into();

        let result = create(&registry, desired).await;
        assert_eq!(result.entry.unwrap().id, "abc-123");
        assert!(registry.stored("abc-123").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_duplicate_rejected() {
        let registry = MemoryRegistry::new();

        let first = create(&registry, entry("/svc", "uid:501")).await;
        let second = create(&registry, entry("/svc", "uid:501")).await;

        assert_eq!(second.status.code, Code::AlreadyExists);
        assert_eq!(second.entry.unwrap().id, first.entry.unwrap().id);
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_selectors() {
        let registry = MemoryRegistry::new();

        let mut desired = entry("/svc", "uid:501");
        desired.selectors.clear();

        let result = create(&registry, desired).await;
        assert_eq!(result.status.code, Code::InvalidArgument);
        assert!(registry.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_list_filters_by_spiffe_id() {
        let registry = MemoryRegistry::new();
        create(&registry, entry("/svc", "uid:501")).await;
        create(&registry, entry("/other", "uid:502")).await;

        let response = registry
            .list_entries(
                &CallContext::new(),
                ListEntriesRequest {
                    filter: crate::types::ListEntriesFilter {
                        by_spiffe_id: Some(SpiffeId::new("example.org", "/svc")),
                    },
                },
            )
            .await
            .unwrap();

        assert_eq!(response.entries.len(), 1);
        assert_eq!(response.entries[0].spiffe_id, Some(SpiffeId::new("example.org", "/svc")));
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let registry = MemoryRegistry::new();

        let mut desired = entry("/svc", "uid:501");
        desired.id = "missing".into();

        let response = registry
            .batch_update_entry(&CallContext::new(), BatchUpdateEntryRequest { entries: vec![desired] })
            .await
            .unwrap();

        assert_eq!(response.results[0].status.code, Code::NotFound);
    }

    #[tokio::test]
    async fn test_delete_reports_per_item() {
        let registry = MemoryRegistry::new();
        let id = create(&registry, entry("/svc", "uid:501")).await.entry.unwrap().id;

        let response = registry
            .batch_delete_entry(
                &CallContext::new(),
                BatchDeleteEntryRequest {
                    ids: vec![id.clone(), "missing".into()],
                },
            )
            .await
            .unwrap();

        assert!(response.results[0].status.is_ok());
        assert_eq!(response.results[0].id, id);
        assert_eq!(response.results[1].status.code, Code::NotFound);
        assert!(registry.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let registry = MemoryRegistry::new();
        registry.set_unavailable(true);

        let err = registry
            .get_entry(&CallContext::new(), GetEntryRequest { id: "x".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code, Code::Unavailable);

        registry.set_unavailable(false);
        let err = registry
            .get_entry(&CallContext::new(), GetEntryRequest { id: "x".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code, Code::NotFound);
    }
}

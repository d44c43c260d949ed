//! Integration Tests for the entry registry
//!
//! These tests drive [`MemoryRegistry`] through the shared `Arc<dyn EntryService>`
//! handle, the way client components use it:
//! - Full create / get / update / delete lifecycle
//! - Conflict detection on create
//! - Filtering by SPIFFE ID

use std::sync::Arc;

use spire_registry::types::{
    BatchCreateEntryRequest, BatchDeleteEntryRequest, BatchUpdateEntryRequest, Entry,
    GetEntryRequest, ListEntriesFilter, ListEntriesRequest, Selector, SpiffeId,
};
use spire_registry::{CallContext, Code, EntryService, MemoryRegistry};

// =============================================================================
// Test Helpers
// =============================================================================

fn service() -> Arc<dyn EntryService> {
    Arc::new(MemoryRegistry::new())
}

fn desired(path: &str, selectors: &[(&str, &str)]) -> Entry {
    Entry {
        id: String::new(),
        spiffe_id: Some(SpiffeId::new("example.org", path)),
        parent_id: Some(SpiffeId::new("example.org", "/some/path")),
        selectors: selectors.iter().map(|(t, v)| Selector::new(*t, *v)).collect(),
    }
}

async fn create(service: &Arc<dyn EntryService>, entry: Entry) -> Entry {
    let response = service
        .batch_create_entry(&CallContext::new(), BatchCreateEntryRequest { entries: vec![entry] })
        .await
        .expect("create call should succeed");

    let result = response.results.into_iter().next().expect("one result");
    assert!(result.status.is_ok(), "create failed: {}", result.status);
    result.entry.expect("created entry echoed")
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_entry_lifecycle() {
    let service = service();
    let ctx = CallContext::new();

    let created = create(&service, desired("/svc", &[("unix", "uid:501")])).await;

    let fetched = service
        .get_entry(&ctx, GetEntryRequest { id: created.id.clone() })
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let mut changed = fetched.clone();
    changed.spiffe_id = Some(SpiffeId::new("example.org", "/svc2"));
    changed.selectors = vec![Selector::new("unix", "uid:1000")];

    let updated = service
        .batch_update_entry(&ctx, BatchUpdateEntryRequest { entries: vec![changed.clone()] })
        .await
        .unwrap();
    assert!(updated.results[0].status.is_ok());
    assert_eq!(updated.results[0].entry.as_ref(), Some(&changed));

    let deleted = service
        .batch_delete_entry(&ctx, BatchDeleteEntryRequest { ids: vec![created.id.clone()] })
        .await
        .unwrap();
    assert!(deleted.results[0].status.is_ok());

    let err = service
        .get_entry(&ctx, GetEntryRequest { id: created.id })
        .await
        .unwrap_err();
    assert_eq!(err.code, Code::NotFound);
}

#[tokio::test]
async fn test_selectors_stored_as_set() {
    let service = service();

    let created = create(
        &service,
        desired("/svc", &[("unix", "uid:501"), ("k8s", "ns:default"), ("unix", "uid:501")]),
    )
    .await;

    assert_eq!(
        created.selectors,
        vec![Selector::new("k8s", "ns:default"), Selector::new("unix", "uid:501")]
    );
}

// =============================================================================
// Conflicts and filters
// =============================================================================

#[tokio::test]
async fn test_caller_supplied_id_conflict() {
    let service = service();

    let mut first = desired("/svc", &[("unix", "uid:501")]);
    first.id = "abc-123".into();
    create(&service, first).await;

    let mut second = desired("/other", &[("unix", "uid:502")]);
    second.id = "abc-123".into();

    let response = service
        .batch_create_entry(&CallContext::new(), BatchCreateEntryRequest { entries: vec![second] })
        .await
        .unwrap();

    assert_eq!(response.results[0].status.code, Code::AlreadyExists);
}

#[tokio::test]
async fn test_list_by_spiffe_id_returns_all_matches() {
    let service = service();
    create(&service, desired("/svc", &[("unix", "uid:501")])).await;
    create(&service, desired("/svc", &[("unix", "uid:502")])).await;
    create(&service, desired("/other", &[("unix", "uid:501")])).await;

    let response = service
        .list_entries(
            &CallContext::new(),
            ListEntriesRequest {
                filter: ListEntriesFilter {
                    by_spiffe_id: Some(SpiffeId::new("example.org", "/svc")),
                },
            },
        )
        .await
        .unwrap();

    assert_eq!(response.entries.len(), 2);

    let all = service
        .list_entries(&CallContext::new(), ListEntriesRequest::default())
        .await
        .unwrap();
    assert_eq!(all.entries.len(), 3);
}

//! Entry API request handlers
//!
//! Each handler forwards to the shared [`EntryService`], rebuilding the
//! caller's [`CallContext`] from the timeout header.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::service::{CallContext, EntryService, TIMEOUT_HEADER};
use crate::status::Status;
use crate::types::{
    BatchCreateEntryRequest, BatchCreateEntryResponse, BatchDeleteEntryRequest,
    BatchDeleteEntryResponse, BatchUpdateEntryRequest, BatchUpdateEntryResponse, Entry,
    GetEntryRequest, ListEntriesRequest, ListEntriesResponse,
};

/// Shared handler state
pub struct AppState {
    pub service: Arc<dyn EntryService>,
}

fn call_context(headers: &HeaderMap) -> Result<CallContext, Status> {
    let Some(value) = headers.get(TIMEOUT_HEADER) else {
        return Ok(CallContext::new());
    };

    let millis: u64 = value
        .to_str()
        .ok()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Status::invalid_argument(format!("invalid {} header", TIMEOUT_HEADER)))?;

    Ok(CallContext::new().with_timeout(Duration::from_millis(millis)))
}

/// POST /v1/entry/list
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ListEntriesRequest>,
) -> Result<Json<ListEntriesResponse>, Status> {
    let ctx = call_context(&headers)?;
    debug!(filter = ?request.filter.by_spiffe_id, "ListEntries");
    Ok(Json(state.service.list_entries(&ctx, request).await?))
}

/// POST /v1/entry/get
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<GetEntryRequest>,
) -> Result<Json<Entry>, Status> {
    let ctx = call_context(&headers)?;
    debug!(id = %request.id, "GetEntry");
    Ok(Json(state.service.get_entry(&ctx, request).await?))
}

/// POST /v1/entry/batch_create
pub async fn batch_create_entry(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<BatchCreateEntryRequest>,
) -> Result<Json<BatchCreateEntryResponse>, Status> {
    let ctx = call_context(&headers)?;
    debug!(count = request.entries.len(), "BatchCreateEntry");
    Ok(Json(state.service.batch_create_entry(&ctx, request).await?))
}

/// POST /v1/entry/batch_update
pub async fn batch_update_entry(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<BatchUpdateEntryRequest>,
) -> Result<Json<BatchUpdateEntryResponse>, Status> {
    let ctx = call_context(&headers)?;
    debug!(count = request.entries.len(), "BatchUpdateEntry");
    Ok(Json(state.service.batch_update_entry(&ctx, request).await?))
}

/// POST /v1/entry/batch_delete
pub async fn batch_delete_entry(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<BatchDeleteEntryRequest>,
) -> Result<Json<BatchDeleteEntryResponse>, Status> {
    let ctx = call_context(&headers)?;
    debug!(count = request.ids.len(), "BatchDeleteEntry");
    Ok(Json(state.service.batch_delete_entry(&ctx, request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Code;
    use axum::http::HeaderValue;

    #[test]
    fn test_call_context_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(call_context(&headers).unwrap().timeout(), None);

        headers.insert(TIMEOUT_HEADER, HeaderValue::from_static("1500"));
        assert_eq!(
            call_context(&headers).unwrap().timeout(),
            Some(Duration::from_millis(1500))
        );

        headers.insert(TIMEOUT_HEADER, HeaderValue::from_static("soon"));
        assert_eq!(call_context(&headers).unwrap_err().code, Code::InvalidArgument);
    }
}

//! The entry service contract
//!
//! [`EntryService`] is the opaque, pre-authenticated handle to a registry.
//! One handle is created per provider and shared behind an `Arc` by every
//! component that talks to the registry.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::status::Status;
use crate::types::{
    BatchCreateEntryRequest, BatchCreateEntryResponse, BatchDeleteEntryRequest,
    BatchDeleteEntryResponse, BatchUpdateEntryRequest, BatchUpdateEntryResponse, Entry,
    GetEntryRequest, ListEntriesRequest, ListEntriesResponse,
};

/// Header carrying the caller's timeout over HTTP
pub const TIMEOUT_HEADER: &str = "x-spire-timeout-ms";

/// Per-call context supplied by the caller
///
/// Implementations must honour `timeout` and must not retry. Cancellation is
/// expressed by dropping the call's future.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    timeout: Option<Duration>,
}

impl CallContext {
    /// A context with no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The call timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// SPIRE entry API
///
/// Whole-call failures (transport, unknown id on `get_entry`) are returned as
/// `Err(Status)`. Batch calls report per-item outcomes in their results and
/// only fail as a whole when the call itself could not be served.
#[async_trait]
pub trait EntryService: Send + Sync + Debug {
    /// List entries, optionally filtered by SPIFFE ID
    async fn list_entries(
        &self,
        ctx: &CallContext,
        request: ListEntriesRequest,
    ) -> Result<ListEntriesResponse, Status>;

    /// Fetch one entry by id
    async fn get_entry(&self, ctx: &CallContext, request: GetEntryRequest) -> Result<Entry, Status>;

    /// Create entries
    async fn batch_create_entry(
        &self,
        ctx: &CallContext,
        request: BatchCreateEntryRequest,
    ) -> Result<BatchCreateEntryResponse, Status>;

    /// Update entries by id
    async fn batch_update_entry(
        &self,
        ctx: &CallContext,
        request: BatchUpdateEntryRequest,
    ) -> Result<BatchUpdateEntryResponse, Status>;

    /// Delete entries by id
    async fn batch_delete_entry(
        &self,
        ctx: &CallContext,
        request: BatchDeleteEntryRequest,
    ) -> Result<BatchDeleteEntryResponse, Status>;
}

//! SPIRE Entry Registry
//!
//! The registry side of the entry API:
//! - Wire shapes of the SPIRE entry API (`ListEntries`, `GetEntry`,
//!   `BatchCreateEntry`, `BatchUpdateEntry`, `BatchDeleteEntry`)
//! - The [`EntryService`] trait, the handle every client component shares
//! - [`MemoryRegistry`], an in-process registry
//! - An HTTP surface exposing any [`EntryService`], served by the
//!   `spire-registry-dev` binary
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /v1/entry/list` - List entries, optionally by SPIFFE ID
//! - `POST /v1/entry/get` - Get an entry by id
//! - `POST /v1/entry/batch_create` - Create entries
//! - `POST /v1/entry/batch_update` - Update entries
//! - `POST /v1/entry/batch_delete` - Delete entries by id

pub mod api;
pub mod memory;
pub mod service;
pub mod status;
pub mod types;

pub use api::create_router;
pub use api::handlers::AppState;
pub use memory::MemoryRegistry;
pub use service::{CallContext, EntryService, TIMEOUT_HEADER};
pub use status::{Code, Status};

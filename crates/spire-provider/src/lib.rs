//! SPIRE Entry Provider
//!
//! Reconciles declarative registration entries against a SPIRE entry
//! registry.
//!
//! ## Architecture
//!
//! - [`SpireProvider`] resolves the provider block and opens one registry
//!   handle, an `Arc<dyn EntryService>`
//! - [`RegistryClient`] translates entries to the wire shapes and issues
//!   calls on that handle
//! - [`EntryReconciler`] implements lookup, create, read, update, delete and
//!   import on top of the client
//! - [`EntryResource`] and [`EntryDataSource`] convert host models and turn
//!   errors into [`Diagnostic`]s
//!
//! ## Usage
//!
//! ```ignore
//! use spire_provider::{ProviderConfigModel, SpireProvider};
//!
//! let data = SpireProvider::default().configure(&ProviderConfigModel::default())?;
//! let state = data.entry_resource().create(plan).await?;
//! println!("Created entry {:?}", state.id);
//! ```

pub mod client;
pub mod config;
pub mod data_source;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod provider;
pub mod reconciler;
pub mod resource;
pub mod transport;

pub use client::{ClientError, ItemOutcome, RegistryClient};
pub use config::{ConfigError, ProviderConfig};
pub use data_source::EntryDataSource;
pub use diagnostics::{Diagnostic, Severity};
pub use error::{ErrorKind, Operation, ReconcileError, Result};
pub use model::{
    EntryDataSourceModel, EntryResourceModel, ProviderConfigModel, SelectorModel, SpiffeIdModel,
};
pub use provider::{ProviderData, SpireProvider};
pub use reconciler::EntryReconciler;
pub use resource::{EntryResource, ReadResponse};
pub use transport::HttpTransport;

/// Provider version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

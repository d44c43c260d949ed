//! # SPIRE Core
//!
//! Value types for SPIRE registration entries, shared by the registry
//! adapter and the reconciler.
//!
//! ## Key Concepts
//!
//! - **SPIFFE ID**: A workload identity made of a trust domain and a path
//! - **Selector**: A `type:value` attestation criterion
//! - **Registration entry**: Binds a SPIFFE ID to a parent ID and a selector set
//!
//! An [`Entry`] is *desired* when built from configuration and *observed* once
//! the registry has assigned it an id and echoed back its stored fields.

pub mod entry;
pub mod error;
pub mod identity;
pub mod selector;

pub use entry::Entry;
pub use error::{CoreError, Result};
pub use identity::SpiffeId;
pub use selector::{Selector, SelectorSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

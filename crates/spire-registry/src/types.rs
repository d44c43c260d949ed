//! Request and response shapes of the SPIRE entry API
//!
//! These are plain wire records with no validation; translation to and from
//! the domain types happens in the client adapter.

use serde::{Deserialize, Serialize};

use crate::status::Status;

/// SPIFFE ID as it appears on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpiffeId {
    pub trust_domain: String,
    #[serde(default)]
    pub path: String,
}

impl SpiffeId {
    pub fn new(trust_domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            trust_domain: trust_domain.into(),
            path: path.into(),
        }
    }
}

/// Selector as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selector {
    #[serde(rename = "type")]
    pub selector_type: String,
    pub value: String,
}

impl Selector {
    pub fn new(selector_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            selector_type: selector_type.into(),
            value: value.into(),
        }
    }
}

/// Registration entry as it appears on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Empty when the registry should assign one
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spiffe_id: Option<SpiffeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SpiffeId>,

    #[serde(default)]
    pub selectors: Vec<Selector>,
}

// =============================================================================
// ListEntries
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEntriesFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_spiffe_id: Option<SpiffeId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEntriesRequest {
    #[serde(default)]
    pub filter: ListEntriesFilter,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEntriesResponse {
    #[serde(default)]
    pub entries: Vec<Entry>,
}

// =============================================================================
// GetEntry
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEntryRequest {
    pub id: String,
}

// =============================================================================
// Batch operations
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchCreateEntryRequest {
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchUpdateEntryRequest {
    pub entries: Vec<Entry>,
}

/// Per-item result of a batch create or update
///
/// `entry` is present on success. On `ALREADY_EXISTS` the registry also
/// returns the conflicting entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryResult {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Entry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchCreateEntryResponse {
    #[serde(default)]
    pub results: Vec<EntryResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchUpdateEntryResponse {
    #[serde(default)]
    pub results: Vec<EntryResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchDeleteEntryRequest {
    pub ids: Vec<String>,
}

/// Per-item result of a batch delete
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteResult {
    pub status: Status,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchDeleteEntryResponse {
    #[serde(default)]
    pub results: Vec<DeleteResult>,
}

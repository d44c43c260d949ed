//! Host configuration models
//!
//! These are the records the host configuration tool reads from
//! configuration and persists as state. They hold raw strings; conversion to
//! [`Entry`] validates them.

use serde::{Deserialize, Serialize};
use spire_core::{CoreError, Entry, Selector, SelectorSet, SpiffeId};

/// `{ trust_domain, path }` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiffeIdModel {
    pub trust_domain: String,
    #[serde(default)]
    pub path: String,
}

impl SpiffeIdModel {
    pub fn new(trust_domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            trust_domain: trust_domain.into(),
            path: path.into(),
        }
    }
}

impl TryFrom<&SpiffeIdModel> for SpiffeId {
    type Error = CoreError;

    fn try_from(model: &SpiffeIdModel) -> Result<Self, Self::Error> {
        SpiffeId::new(model.trust_domain.clone(), model.path.clone())
    }
}

impl From<&SpiffeId> for SpiffeIdModel {
    fn from(id: &SpiffeId) -> Self {
        Self::new(id.trust_domain(), id.path())
    }
}

/// `{ type, value }` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorModel {
    #[serde(rename = "type")]
    pub selector_type: String,
    pub value: String,
}

impl SelectorModel {
    pub fn new(selector_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            selector_type: selector_type.into(),
            value: value.into(),
        }
    }
}

impl From<&Selector> for SelectorModel {
    fn from(selector: &Selector) -> Self {
        Self::new(selector.selector_type(), selector.value())
    }
}

fn selectors_from_models(models: &[SelectorModel]) -> Result<SelectorSet, CoreError> {
    models
        .iter()
        .map(|m| Selector::new(m.selector_type.clone(), m.value.clone()))
        .collect()
}

fn selectors_to_models(selectors: &SelectorSet) -> Vec<SelectorModel> {
    selectors.iter().map(SelectorModel::from).collect()
}

fn non_empty(id: &Option<String>) -> Option<String> {
    id.clone().filter(|id| !id.is_empty())
}

// =============================================================================
// Resource
// =============================================================================

/// The `spire_entry` resource record
///
/// `id` is computed by the registry and kept from prior state once known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryResourceModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub spiffe_id: SpiffeIdModel,
    pub parent_id: SpiffeIdModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<Vec<SelectorModel>>,
}

impl EntryResourceModel {
    /// Convert to a desired entry
    pub fn to_entry(&self) -> Result<Entry, CoreError> {
        let mut entry = Entry::new(SpiffeId::try_from(&self.spiffe_id)?)
            .with_parent(SpiffeId::try_from(&self.parent_id)?)
            .with_selectors(selectors_from_models(self.selectors.as_deref().unwrap_or_default())?);
        entry.id = non_empty(&self.id);
        Ok(entry)
    }

    /// Build state from an observed entry
    pub fn from_entry(entry: &Entry) -> Result<Self, CoreError> {
        let parent_id = entry
            .parent_id
            .as_ref()
            .ok_or(CoreError::MissingField("parent_id"))?;

        Ok(Self {
            id: entry.id.clone(),
            spiffe_id: SpiffeIdModel::from(&entry.spiffe_id),
            parent_id: SpiffeIdModel::from(parent_id),
            selectors: Some(selectors_to_models(&entry.selectors)),
        })
    }
}

// =============================================================================
// Data source
// =============================================================================

/// The `spire_entry` data source record
///
/// Only `spiffe_id` is configured; everything else is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDataSourceModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub spiffe_id: SpiffeIdModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SpiffeIdModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<Vec<SelectorModel>>,
}

impl EntryDataSourceModel {
    /// A query for one SPIFFE ID
    pub fn query(spiffe_id: SpiffeIdModel) -> Self {
        Self {
            id: None,
            spiffe_id,
            parent_id: None,
            selectors: None,
        }
    }

    /// Build state from an observed entry
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            id: entry.id.clone(),
            spiffe_id: SpiffeIdModel::from(&entry.spiffe_id),
            parent_id: entry.parent_id.as_ref().map(SpiffeIdModel::from),
            selectors: Some(selectors_to_models(&entry.selectors)),
        }
    }
}

// =============================================================================
// Provider
// =============================================================================

/// The provider block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfigModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}
